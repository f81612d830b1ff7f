//! Prompt text for the palm analysis and the chat persona.

use crate::forms::{HistoryTurn, PromptProfile};
use crate::models::{AnalysisResult, Domain};
use lazy_static::lazy_static;
use regex::Regex;

/// Prior turns kept as chat context.
pub const HISTORY_WINDOW: usize = 10;

const NOT_PROVIDED: &str = "Not provided";

lazy_static! {
    static ref FENCE_OPEN: Regex = Regex::new(r"```json\s*\n?").unwrap();
    static ref FENCE_CLOSE: Regex = Regex::new(r"```\s*$").unwrap();
}

/// Models sometimes wrap JSON answers in markdown fences.
pub fn strip_code_fences(content: &str) -> String {
    let opened = FENCE_OPEN.replace_all(content, "");
    FENCE_CLOSE.replace_all(&opened, "").trim().to_string()
}

fn profile_lines(profile: &PromptProfile) -> String {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(NOT_PROVIDED)
            .to_string()
    };

    format!(
        "User Profile:\n- Date of Birth: {}\n- Hand Preference: {}\n- Gender: {}\n",
        field(&profile.date_of_birth),
        field(&profile.hand_preference),
        field(&profile.gender),
    )
}

pub const UNUSABLE_IMAGE: &str = "The palm image is not clear or it's not a palm image. \
Please upload a clear photo of your palm with good lighting showing the palm lines clearly.";

const ANALYSIS_SCHEMA: &str = r#"{
  "lifePath": {"score": 0-100 from life line strength and mount development, "description": "...", "keywords": ["...", "...", "..."]},
  "career": {"score": 0-100 from head line, fate line and relevant mounts, "description": "...", "keywords": ["...", "...", "..."]},
  "relationships": {"score": 0-100 from heart line and Venus mount, "description": "...", "keywords": ["...", "...", "..."]},
  "health": {"score": 0-100 from life line vitality and palm health, "description": "...", "keywords": ["...", "...", "..."]},
  "spiritual": {"score": 0-100 from intuition lines and mounts, "description": "...", "keywords": ["...", "...", "..."]},
  "palmLines": {
    "heartLine": {"description": "start point, arch, depth, length, breaks, chains, islands, forks", "characteristics": ["...", "...", "..."]},
    "headLine": {"description": "start point, angle, curve, depth, length, islands, breaks", "characteristics": ["...", "...", "..."]},
    "lifeLine": {"description": "curve around the thumb mount, depth, breaks, chains, markings", "characteristics": ["...", "...", "..."]},
    "fateLine": {"description": "origin, direction, continuity; say so explicitly if it is not visible", "characteristics": ["...", "...", "..."]},
    "additionalFeatures": {"description": "marriage, travel and money lines, stars, crosses, triangles, prominent mounts, fingers, skin", "characteristics": ["...", "...", "..."]}
  }
}"#;

/// Instructions sent alongside the palm photo.
pub fn palm_reading_prompt(profile: &PromptProfile) -> String {
    format!(
        "You are an expert palmist with decades of experience. Start by deciding whether \
this image shows a clear, readable palm.

IMAGE VALIDATION:
1. The image must show the inside of a hand.
2. The quality must be good enough for palmistry.
3. The palm lines must be clearly visible.
4. The lighting must allow a proper reading.

If the image is not suitable (blurry, not a palm, poor lighting, unclear lines), answer with ONLY:
{{\"error\": \"{unusable}\"}}

Otherwise read the palm in detail.

{profile}
Base every statement on what is actually visible in this palm: the depth, length, curvature, \
breaks, chains and islands of each line, the hand shape (square, rectangular, spatulate, \
pointed, mixed), the development of the Venus, Jupiter, Saturn, Apollo, Mercury, Mars and \
Moon mounts, finger proportions, skin texture and any stars, crosses, triangles or islands.

Answer with ONLY valid JSON of exactly this structure, no markdown and no code blocks:
{schema}

Do not use generic descriptions. Every score and description must come from this person's palm.",
        unusable = UNUSABLE_IMAGE,
        profile = profile_lines(profile),
        schema = ANALYSIS_SCHEMA,
    )
}

/// System instruction of the chat persona, grounded in the reading and profile.
pub fn chat_system_prompt(analysis: Option<&AnalysisResult>, profile: Option<&PromptProfile>) -> String {
    let palm_context = analysis
        .map(|analysis| {
            let mut context = String::from("Palm Reading Analysis:\n");
            for domain in Domain::ALL {
                let reading = analysis.domain(domain);
                context.push_str(&format!(
                    "- {} Score: {}/100 - {}\n",
                    domain.label(),
                    reading.score,
                    reading.description
                ));
            }
            context
        })
        .unwrap_or_default();
    let user_context = profile.map(profile_lines).unwrap_or_default();

    format!(
        "You are a wise and intuitive palm reading guide with deep knowledge of palmistry, \
spirituality and life guidance. You give personalized insights based on the user's palm \
analysis and profile.

{palm_context}
{user_context}
Guidelines:
- Be warm, empathetic and encouraging
- Refer to specific details of their palm reading when relevant
- Pair practical advice with spiritual insight
- Keep answers concise but meaningful (2-3 paragraphs max)
- Be specific about timing when discussing future events
- Connect their palm reading to their current question
- Use a mystical but grounded tone"
    )
}

/// The last `HISTORY_WINDOW` turns, oldest first.
pub fn history_window(history: &[HistoryTurn]) -> &[HistoryTurn] {
    let skip = history.len().saturating_sub(HISTORY_WINDOW);
    &history[skip..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let wrapped = "```json\n{\"error\":\"blurry\"}\n```";
        assert_eq!(strip_code_fences(wrapped), "{\"error\":\"blurry\"}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn missing_profile_fields_read_not_provided() {
        let prompt = palm_reading_prompt(&PromptProfile {
            date_of_birth: None,
            hand_preference: Some("left".to_string()),
            gender: Some(String::new()),
        });

        assert!(prompt.contains("- Date of Birth: Not provided"));
        assert!(prompt.contains("- Hand Preference: left"));
        assert!(prompt.contains("- Gender: Not provided"));
        assert!(prompt.contains(UNUSABLE_IMAGE));
    }

    #[test]
    fn system_prompt_lists_every_score() {
        let analysis = AnalysisResult::sample();
        let prompt = chat_system_prompt(Some(&analysis), None);

        assert!(prompt.contains("- Life Path Score: 78/100 - A long, even life line"));
        assert!(prompt.contains("- Career Score: 84/100"));
        assert!(prompt.contains("- Spiritual Score: 59/100"));
        assert!(!prompt.contains("User Profile:"));
    }

    #[test]
    fn history_keeps_the_last_ten() {
        let history: Vec<HistoryTurn> = (0..15)
            .map(|i| HistoryTurn {
                message_type: "user".to_string(),
                content: i.to_string(),
            })
            .collect();

        let window = history_window(&history);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "5");
        assert_eq!(history_window(&history[..3]).len(), 3);
    }
}
