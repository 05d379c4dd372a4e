use super::model::AuditExperience;
use crate::error::Result;
use crate::section::AuditSection;

/// Number of experiences kept across all sections.
pub const EXPERIENCE_CAPACITY: usize = 50;

/// Number of experiences replayed into a prompt.
pub const RELEVANT_CONTEXT_LIMIT: usize = 5;

/// Persistence for institutional memory.
pub trait ExperienceRepository: Send + Sync {
    /// Adds an experience, keeping only the most recent
    /// [`EXPERIENCE_CAPACITY`] records by timestamp.
    fn save_experience(&self, experience: AuditExperience) -> Result<()>;

    /// All stored experiences, most recent first.
    fn get_all(&self) -> Vec<AuditExperience>;

    /// Memory feed for prompts of the given section, or an empty string.
    fn get_relevant_context(&self, section: AuditSection) -> String {
        render_memory_feed(&self.get_all(), section)
    }
}

/// Renders the first [`RELEVANT_CONTEXT_LIMIT`] experiences of `section`
/// (in the given order) as a labeled block.
pub fn render_memory_feed(experiences: &[AuditExperience], section: AuditSection) -> String {
    let relevant: Vec<String> = experiences
        .iter()
        .filter(|e| e.section == section)
        .take(RELEVANT_CONTEXT_LIMIT)
        .map(|e| format!("[PREVIOUS LEARNING]: {}", e.technical_learning))
        .collect();

    if relevant.is_empty() {
        String::new()
    } else {
        format!("INSTITUTIONAL MEMORY FEED:\n{}", relevant.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experience::Importance;

    fn exp(section: AuditSection, learning: &str, ts: i64) -> AuditExperience {
        AuditExperience::new(section, "query", learning, Importance::Medium).with_timestamp(ts)
    }

    #[test]
    fn test_empty_feed() {
        assert_eq!(render_memory_feed(&[], AuditSection::AuditPlan), "");
    }

    #[test]
    fn test_feed_filters_section_and_limits() {
        let mut all = Vec::new();
        for i in 0..8 {
            all.push(exp(AuditSection::AuditPlan, &format!("plan {i}"), 100 - i));
        }
        all.push(exp(AuditSection::TaxCompliance, "tax", 200));

        let feed = render_memory_feed(&all, AuditSection::AuditPlan);
        let lines: Vec<&str> = feed.lines().collect();
        assert_eq!(lines[0], "INSTITUTIONAL MEMORY FEED:");
        assert_eq!(lines.len(), 1 + RELEVANT_CONTEXT_LIMIT);
        assert_eq!(lines[1], "[PREVIOUS LEARNING]: plan 0");
        assert!(!feed.contains("tax"));
    }
}
