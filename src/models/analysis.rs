use serde::{Deserialize, Serialize};

/// The five scored life domains of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    LifePath,
    Career,
    Relationships,
    Health,
    Spiritual,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::LifePath,
        Domain::Career,
        Domain::Relationships,
        Domain::Health,
        Domain::Spiritual,
    ];

    /// Short name used in prompts ("Career Score: 72/100").
    pub fn label(&self) -> &'static str {
        match self {
            Self::LifePath => "Life Path",
            Self::Career => "Career",
            Self::Relationships => "Relationships",
            Self::Health => "Health",
            Self::Spiritual => "Spiritual",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LifePath => "Life Path & Destiny",
            Self::Career => "Career & Success",
            Self::Relationships => "Love & Relationships",
            Self::Health => "Health & Vitality",
            Self::Spiritual => "Spiritual Growth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReading {
    pub score: u8,
    pub description: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReading {
    pub description: String,
    pub characteristics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalmLines {
    pub heart_line: LineReading,
    pub head_line: LineReading,
    pub life_line: LineReading,
    pub fate_line: LineReading,
    pub additional_features: LineReading,
}

impl PalmLines {
    pub fn entries(&self) -> [(&'static str, &LineReading); 5] {
        [
            ("Heart Line", &self.heart_line),
            ("Head Line", &self.head_line),
            ("Life Line", &self.life_line),
            ("Fate Line", &self.fate_line),
            ("Additional Features", &self.additional_features),
        ]
    }
}

/// Structured palm analysis. Every field is required: a payload missing any
/// domain or line does not deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub life_path: DomainReading,
    pub career: DomainReading,
    pub relationships: DomainReading,
    pub health: DomainReading,
    pub spiritual: DomainReading,
    pub palm_lines: PalmLines,
}

impl AnalysisResult {
    pub fn domain(&self, domain: Domain) -> &DomainReading {
        match domain {
            Domain::LifePath => &self.life_path,
            Domain::Career => &self.career,
            Domain::Relationships => &self.relationships,
            Domain::Health => &self.health,
            Domain::Spiritual => &self.spiritual,
        }
    }

    pub fn domains(&self) -> impl Iterator<Item = (Domain, &DomainReading)> {
        Domain::ALL.into_iter().map(move |d| (d, self.domain(d)))
    }

    /// Scores are percentages.
    pub fn check(&self) -> Result<(), String> {
        match self.domains().find(|(_, reading)| reading.score > 100) {
            Some((domain, reading)) => Err(format!(
                "{} score {} is outside 0-100",
                domain.label(),
                reading.score
            )),
            None => Ok(()),
        }
    }
}

/// What the analysis collaborator answered: either a full result or the
/// `{error}` sentinel meaning the photo is unusable. Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    Rejected(String),
}

#[cfg(test)]
impl AnalysisResult {
    pub fn sample() -> Self {
        let domain = |score: u8, description: &str| DomainReading {
            score,
            description: description.to_string(),
            keywords: vec!["steady".to_string(), "curious".to_string()],
        };
        let line = |description: &str| LineReading {
            description: description.to_string(),
            characteristics: vec!["deep".to_string(), "unbroken".to_string()],
        };

        Self {
            life_path: domain(78, "A long, even life line"),
            career: domain(84, "A clear fate line toward Saturn"),
            relationships: domain(66, "A curved heart line"),
            health: domain(71, "Strong vitality indicators"),
            spiritual: domain(59, "A faint intuition line"),
            palm_lines: PalmLines {
                heart_line: line("Starts under Jupiter"),
                head_line: line("Slopes gently toward the Moon mount"),
                life_line: line("Wide arc around Venus"),
                fate_line: line("Rises from the wrist"),
                additional_features: line("Two marriage lines"),
            },
        }
    }
}
