//! Authoring checks that do not stop a nugget from loading.

use std::fmt;

use crate::models::{Feedback, Nugget, QuizBlock};

/// Gap ranges listed before the rest are summarised.
const MAX_LISTED_GAPS: usize = 3;

/// A warning from nugget validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Section index.
    pub section: usize,
    /// Quiz ordinal within the section (if applicable).
    pub block: Option<usize>,
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.block {
            Some(block) => write!(f, "section {} quiz {}: {}", self.section + 1, block + 1, self.message),
            None => write!(f, "section {}: {}", self.section + 1, self.message),
        }
    }
}

/// Validate a parsed nugget for common authoring issues.
pub fn validate_nugget(nugget: &Nugget) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (index, section) in nugget.sections.iter().enumerate() {
        let mut warn = |block: Option<usize>, message: String| {
            warnings.push(ValidationWarning {
                section: index,
                block,
                message,
            });
        };

        if section.level > 0 && section.title.is_empty() {
            warn(None, "heading has no title".into());
        }

        let gaps = section.fragment_group().gaps();
        if !gaps.is_empty() {
            let mut missing: Vec<String> = gaps
                .iter()
                .take(MAX_LISTED_GAPS)
                .map(|gap| match (gap.start(), gap.end()) {
                    (start, end) if start == end => format!("{{{{{}}}}}", start),
                    (start, end) => format!("{{{{{}}}}}..{{{{{}}}}}", start, end),
                })
                .collect();
            if gaps.len() > MAX_LISTED_GAPS {
                missing.push(format!("and {} more", gaps.len() - MAX_LISTED_GAPS));
            }
            warn(None, format!("fragment markers skip {}", missing.join(", ")));
        }

        for (ordinal, quiz) in section.quizzes().into_iter().enumerate() {
            for message in quiz_findings(quiz) {
                warn(Some(ordinal), message);
            }
        }
    }

    warnings
}

fn quiz_findings(quiz: &QuizBlock) -> Vec<String> {
    let mut findings = Vec::new();

    if quiz.prompt.trim().is_empty() {
        findings.push("prompt is empty".into());
    }

    if quiz.options.len() < 2 {
        findings.push(format!("only {} option", quiz.options.len()));
    }

    let computed_only = quiz.handler.as_ref().is_some_and(|h| !h.has_messages());
    match (quiz.feedback(), computed_only) {
        (Feedback::Silent, true) => findings.push(
            "handler only sends computed messages and there is no [[?]] explanation, learners get no feedback"
                .into(),
        ),
        (Feedback::Silent, false) => {
            findings.push("no [[?]] explanation or handler, learners get no feedback".into())
        }
        (_, true) => findings
            .push("handler only sends computed messages, learners see the [[?]] explanation".into()),
        _ => {}
    }

    if let Some(expected) = quiz.handler.as_ref().and_then(|h| h.expected) {
        if expected != quiz.correct_index {
            findings.push(format!(
                "handler expects option {} but [(X)] marks option {}",
                expected, quiz.correct_index
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_nugget;

    #[test]
    fn test_clean_nugget_has_no_warnings() {
        let nugget = parse_nugget(
            "# ANOVA\n\n{{1}}\nGroups.\n\nWhich test?\n\n[(X)] ANOVA\n[( )] t-test\n[[?]] Three groups.\n",
        )
        .unwrap();
        assert!(validate_nugget(&nugget).is_empty());
    }

    #[test]
    fn test_missing_feedback_is_flagged() {
        let nugget = parse_nugget("# ANOVA\n\n**Question 1:** Assumptions?\n\n[(X)] Normality\n[( )] None\n").unwrap();
        let warnings = validate_nugget(&nugget);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].block, Some(0));
        assert!(warnings[0].message.contains("no feedback"));
        assert_eq!(
            warnings[0].to_string(),
            "section 1 quiz 1: no [[?]] explanation or handler, learners get no feedback"
        );
    }

    #[test]
    fn test_fragment_gaps() {
        let nugget = parse_nugget("# T\n\n{{1}} one\n\n{{3}} three\n").unwrap();
        let warnings = validate_nugget(&nugget);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "fragment markers skip {{2}}");
    }

    #[test]
    fn test_fragment_gap_ranges_are_bounded() {
        let nugget = parse_nugget("# T\n\n{{1}} one\n\n{{4294967295}} last\n").unwrap();
        let warnings = validate_nugget(&nugget);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "fragment markers skip {{2}}..{{4294967294}}");

        let nugget = parse_nugget("# T\n\n{{2}} a\n\n{{4}} b\n\n{{6}} c\n\n{{8}} d\n").unwrap();
        let warnings = validate_nugget(&nugget);
        assert_eq!(
            warnings[0].message,
            "fragment markers skip {{1}}, {{3}}, {{5}}, and 1 more"
        );
    }

    #[test]
    fn test_computed_handler_messages() {
        let nugget = parse_nugget(
            "# T\n\nSame?\n\n[(X)] yes\n[( )] no\n[[?]] Equal means.\n\
             <script>let msg = \"@input\" == 0 ? \"yes\" : \"no\";\nsend.lia(msg)</script>\n",
        )
        .unwrap();
        let messages: Vec<_> = validate_nugget(&nugget).into_iter().map(|w| w.message).collect();
        assert_eq!(
            messages,
            vec!["handler only sends computed messages, learners see the [[?]] explanation".to_string()]
        );
    }

    #[test]
    fn test_handler_disagreement_and_empty_prompt() {
        let nugget = parse_nugget(
            "# T\n\n[(X)] a\n[( )] b\n<script>if (@input == 1) send.lia('ok'); else send.lia('no')</script>\n",
        )
        .unwrap();
        let messages: Vec<_> = validate_nugget(&nugget).into_iter().map(|w| w.message).collect();
        assert_eq!(
            messages,
            vec![
                "prompt is empty".to_string(),
                "handler expects option 1 but [(X)] marks option 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_single_option_and_untitled_heading() {
        let nugget = parse_nugget("#\n\nOnly?\n\n[(X)] yes\n[[?]] hmm\n").unwrap();
        let messages: Vec<_> = validate_nugget(&nugget).into_iter().map(|w| w.message).collect();
        assert_eq!(messages, vec!["heading has no title".to_string(), "only 1 option".to_string()]);
    }
}
