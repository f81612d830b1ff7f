//! Read-only report pages built from a stored reading.

use crate::models::{AnalysisResult, Domain, PalmReading, UserProfile};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Exceptional,
    Strong,
    Moderate,
    Developing,
    Emerging,
}

impl From<u8> for ScoreBand {
    fn from(score: u8) -> Self {
        match score {
            85.. => Self::Exceptional,
            70..=84 => Self::Strong,
            55..=69 => Self::Moderate,
            40..=54 => Self::Developing,
            _ => Self::Emerging,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPage {
    Overview,
    DetailedAnalysis,
    Insights,
}

impl ReportPage {
    pub const COUNT: u8 = 3;

    pub fn number(&self) -> u8 {
        match self {
            Self::Overview => 1,
            Self::DetailedAnalysis => 2,
            Self::Insights => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Overview & Profile",
            Self::DetailedAnalysis => "Detailed Analysis",
            Self::Insights => "Insights & Summary",
        }
    }
}

impl TryFrom<u8> for ReportPage {
    type Error = String;

    fn try_from(page: u8) -> Result<Self, Self::Error> {
        match page {
            1 => Ok(Self::Overview),
            2 => Ok(Self::DetailedAnalysis),
            3 => Ok(Self::Insights),
            other => Err(format!("Report page {other} does not exist")),
        }
    }
}

pub const GUIDANCE: [&str; 6] = [
    "Make room for a quiet daily practice to balance strong mental focus.",
    "Keep up regular physical activity through periods of change.",
    "Take on leadership or study opportunities that stretch your career.",
    "Listen closely in conversations to deepen your relationships.",
    "Give creative and intuitive pursuits a fixed place in your week.",
    "Look after sleep, diet and stress as the base of your health.",
];

#[derive(Debug, Clone, Serialize)]
pub struct DomainCard {
    pub domain: Domain,
    pub title: &'static str,
    pub score: u8,
    pub band: ScoreBand,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineCard {
    pub name: &'static str,
    pub description: String,
    pub characteristics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    Overview {
        profile: Option<UserProfile>,
        highlights: Vec<DomainCard>,
    },
    DetailedAnalysis {
        domains: Vec<DomainCard>,
        palm_lines: Vec<LineCard>,
    },
    Insights {
        average_score: u8,
        strongest: DomainCard,
        growth_area: DomainCard,
        guidance: [&'static str; 6],
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub page: u8,
    pub pages: u8,
    pub title: &'static str,
    pub content: PageContent,
}

fn cards(analysis: &AnalysisResult, with_keywords: bool) -> Vec<DomainCard> {
    analysis
        .domains()
        .map(|(domain, reading)| DomainCard {
            domain,
            title: domain.title(),
            score: reading.score,
            band: ScoreBand::from(reading.score),
            description: reading.description.clone(),
            keywords: if with_keywords {
                reading.keywords.clone()
            } else {
                vec![]
            },
        })
        .collect()
}

pub fn render(page: ReportPage, reading: &PalmReading, profile: Option<UserProfile>) -> ReportView {
    let analysis = &reading.analysis_data;
    let content = match page {
        ReportPage::Overview => PageContent::Overview {
            profile,
            highlights: cards(analysis, false),
        },
        ReportPage::DetailedAnalysis => PageContent::DetailedAnalysis {
            domains: cards(analysis, true),
            palm_lines: analysis
                .palm_lines
                .entries()
                .into_iter()
                .map(|(name, line)| LineCard {
                    name,
                    description: line.description.clone(),
                    characteristics: line.characteristics.clone(),
                })
                .collect(),
        },
        ReportPage::Insights => {
            let mut all = cards(analysis, true);
            let total: u32 = all.iter().map(|c| u32::from(c.score)).sum();
            let average_score = (total as f64 / all.len() as f64).round() as u8;
            // stable sort keeps declaration order between equal scores
            all.sort_by(|a, b| b.score.cmp(&a.score));
            let strongest = all[0].clone();
            let growth_area = all[all.len() - 1].clone();
            PageContent::Insights {
                average_score,
                strongest,
                growth_area,
                guidance: GUIDANCE,
            }
        }
    };

    ReportView {
        page: page.number(),
        pages: ReportPage::COUNT,
        title: page.title(),
        content,
    }
}
