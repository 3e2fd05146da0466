//! Markup parser for nugget documents.
//!
//! The document is first split into sections at ATX headings. Each section
//! body is then read block by block: fenced code, HTML comments, fragment
//! markers, quiz blocks and plain paragraphs. Fenced code is opaque, so a
//! heading or an option line inside a fence is never interpreted.

use tracing::debug;

use crate::error::{MalformedBlock, ParseError};
use crate::models::{Block, Fragment, Nugget, QuizBlock, ResponseHandler, Section};

/// Parse a whole nugget document.
pub fn parse_nugget(text: &str) -> Result<Nugget, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections = Vec::new();

    for raw in split_sections(&lines) {
        let blocks = BlockParser::new(&lines[raw.start..raw.end], raw.start + 1).parse()?;
        if raw.level == 0 && blocks.is_empty() {
            continue;
        }

        debug!(title = raw.title, blocks = blocks.len(), "parsed section");
        sections.push(Section {
            title: raw.title.to_string(),
            level: raw.level,
            blocks,
        });
    }

    let title = sections
        .iter()
        .find(|section| section.level == 1)
        .map(|section| section.title.clone())
        .unwrap_or_default();

    Ok(Nugget { title, sections })
}

/// Parse the literal text of a single quiz block. Anything besides that one
/// block (prompt included) is rejected.
pub fn parse_quiz_block(text: &str) -> Result<QuizBlock, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let blocks = BlockParser::new(&lines, 1).parse()?;

    let error = |kind| ParseError { line: 1, kind };
    if !blocks.iter().any(|block| matches!(block, Block::Quiz(_))) {
        return Err(error(MalformedBlock::NoOptions));
    }

    let mut blocks = blocks.into_iter();
    match (blocks.next(), blocks.next()) {
        (Some(Block::Quiz(quiz)), None) => Ok(quiz),
        _ => Err(error(MalformedBlock::ExtraContent)),
    }
}

struct RawSection<'a> {
    title: &'a str,
    level: u8,
    start: usize,
    end: usize,
}

fn split_sections<'a>(lines: &[&'a str]) -> Vec<RawSection<'a>> {
    let mut sections = vec![RawSection {
        title: "",
        level: 0,
        start: 0,
        end: lines.len(),
    }];
    let mut fence: Option<Fence> = None;
    let mut in_comment = false;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if in_comment {
            in_comment = !trimmed.contains("-->");
            continue;
        }
        if let Some(open) = &fence {
            if open.closes(trimmed) {
                fence = None;
            }
            continue;
        }
        if let Some((open, _)) = Fence::open(trimmed) {
            fence = Some(open);
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix("<!--") {
            in_comment = !comment.contains("-->");
            continue;
        }

        if let Some((level, title)) = heading(line) {
            if let Some(last) = sections.last_mut() {
                last.end = index;
            }
            sections.push(RawSection {
                title,
                level,
                start: index + 1,
                end: lines.len(),
            });
        }
    }

    sections
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }

    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }

    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    Some((level as u8, rest.trim()))
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Recognise an opening fence and return it with its info string.
    fn open(trimmed: &str) -> Option<(Fence, &str)> {
        let marker = trimmed.chars().next()?;
        if marker != '`' && marker != '~' {
            return None;
        }

        let len = trimmed.chars().take_while(|&c| c == marker).count();
        if len < 3 {
            return None;
        }

        Some((Fence { marker, len }, trimmed[len..].trim()))
    }

    fn closes(&self, trimmed: &str) -> bool {
        let count = trimmed.chars().take_while(|&c| c == self.marker).count();
        count >= self.len && trimmed[count..].trim().is_empty()
    }
}

fn option_line(trimmed: &str) -> Option<(bool, &str)> {
    let rest = trimmed.strip_prefix("[(")?;
    let (mark, text) = rest.split_once(")]")?;
    let is_correct = match mark {
        " " => false,
        "X" | "x" => true,
        _ => return None,
    };
    Some((is_correct, text.trim()))
}

fn hint_line(trimmed: &str) -> Option<&str> {
    trimmed.strip_prefix("[[?]]").map(str::trim)
}

fn fragment_marker(trimmed: &str) -> Option<(u32, &str)> {
    let rest = trimmed.strip_prefix("{{")?;
    let (inner, after) = rest.split_once("}}")?;
    let index = inner.trim().parse().ok()?;
    Some((index, after.trim()))
}

/// Length of a line made only of `*`, at least three long.
fn star_rule(trimmed: &str) -> Option<usize> {
    (trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'*')).then_some(trimmed.len())
}

fn starts_block(trimmed: &str) -> bool {
    Fence::open(trimmed).is_some()
        || trimmed.starts_with("<!--")
        || fragment_marker(trimmed).is_some()
        || option_line(trimmed).is_some()
        || hint_line(trimmed).is_some()
}

fn take_prompt(blocks: &mut Vec<Block>) -> String {
    match blocks.last() {
        Some(Block::Text { .. }) => match blocks.pop() {
            Some(Block::Text { text }) => text,
            _ => String::new(),
        },
        _ => String::new(),
    }
}

struct BlockParser<'a> {
    lines: &'a [&'a str],
    pos: usize,
    /// 1-based line number of `lines[0]`.
    first_line: usize,
}

impl<'a> BlockParser<'a> {
    fn new(lines: &'a [&'a str], first_line: usize) -> Self {
        Self {
            lines,
            pos: 0,
            first_line,
        }
    }

    fn parse(mut self) -> Result<Vec<Block>, ParseError> {
        let mut blocks = Vec::new();
        while self.skip_blank() {
            self.element(&mut blocks)?;
        }
        Ok(blocks)
    }

    fn error(&self, at: usize, kind: MalformedBlock) -> ParseError {
        ParseError {
            line: self.first_line + at,
            kind,
        }
    }

    fn peek_trimmed(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(|line| line.trim())
    }

    /// Skip blank lines. Returns false at the end of input.
    fn skip_blank(&mut self) -> bool {
        while let Some(line) = self.lines.get(self.pos) {
            if !line.trim().is_empty() {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    fn element(&mut self, blocks: &mut Vec<Block>) -> Result<(), ParseError> {
        let Some(trimmed) = self.peek_trimmed() else {
            return Ok(());
        };

        if let Some((fence, info)) = Fence::open(trimmed) {
            blocks.push(self.code(fence, info));
        } else if trimmed.starts_with("<!--") {
            self.skip_comment();
        } else if let Some((index, rest)) = fragment_marker(trimmed) {
            let fragment = self.fragment(index, rest)?;
            blocks.push(Block::Fragment(fragment));
        } else if option_line(trimmed).is_some() {
            let prompt = take_prompt(blocks);
            let quiz = self.quiz(prompt)?;
            blocks.push(Block::Quiz(quiz));
        } else if hint_line(trimmed).is_some() {
            return Err(self.error(self.pos, MalformedBlock::OrphanHint));
        } else {
            let text = self.paragraph().join("\n");
            blocks.push(Block::Text { text });
        }

        Ok(())
    }

    fn paragraph(&mut self) -> Vec<&'a str> {
        let mut lines = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            let trimmed = line.trim();
            if trimmed.is_empty() || (!lines.is_empty() && starts_block(trimmed)) {
                break;
            }
            lines.push(line.trim_end());
            self.pos += 1;
        }
        lines
    }

    fn code(&mut self, fence: Fence, info: &str) -> Block {
        self.pos += 1;
        let mut code = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            self.pos += 1;
            if fence.closes(line.trim()) {
                break;
            }
            code.push(*line);
        }

        Block::Code {
            info: info.to_string(),
            code: code.join("\n"),
        }
    }

    fn skip_comment(&mut self) {
        let first = self.lines[self.pos].trim();
        self.pos += 1;
        if first["<!--".len()..].contains("-->") {
            return;
        }

        while let Some(line) = self.lines.get(self.pos) {
            self.pos += 1;
            if line.contains("-->") {
                return;
            }
        }
    }

    fn fragment(&mut self, index: u32, rest: &'a str) -> Result<Fragment, ParseError> {
        let start = self.pos;
        self.pos += 1;

        if !rest.is_empty() {
            let mut lines = vec![rest];
            if self
                .peek_trimmed()
                .is_some_and(|next| !next.is_empty() && !starts_block(next))
            {
                lines.extend(self.paragraph());
            }
            return Ok(Fragment {
                index,
                blocks: vec![Block::Text {
                    text: lines.join("\n"),
                }],
            });
        }

        if let Some(stars) = self.peek_trimmed().and_then(star_rule) {
            let open = self.pos;
            let close = (open + 1..self.lines.len())
                .find(|&i| star_rule(self.lines[i].trim()) == Some(stars))
                .ok_or_else(|| self.error(start, MalformedBlock::UnterminatedFragment))?;

            let blocks =
                BlockParser::new(&self.lines[open + 1..close], self.first_line + open + 1).parse()?;
            self.pos = close + 1;
            return Ok(Fragment { index, blocks });
        }

        let mut blocks = Vec::new();
        if self.skip_blank() {
            self.element(&mut blocks)?;
        }
        Ok(Fragment { index, blocks })
    }

    fn quiz(&mut self, prompt: String) -> Result<QuizBlock, ParseError> {
        let start = self.pos;

        let mut options = Vec::new();
        let mut correct = Vec::new();
        while let Some((is_correct, text)) = self.peek_trimmed().and_then(option_line) {
            if is_correct {
                correct.push(options.len());
            }
            options.push(text.to_string());
            self.pos += 1;
        }

        let mut hints = Vec::new();
        while let Some(hint) = self.peek_trimmed().and_then(hint_line) {
            hints.push(hint);
            self.pos += 1;
        }

        let handler = match self.peek_trimmed() {
            Some(line) if line.starts_with("<script") => Some(self.script()?),
            _ => None,
        };

        let correct_index = match correct.as_slice() {
            [index] => *index,
            [] => return Err(self.error(start, MalformedBlock::MissingCorrectOption)),
            many => {
                return Err(self.error(
                    start,
                    MalformedBlock::MultipleCorrectOptions { count: many.len() },
                ));
            }
        };

        Ok(QuizBlock {
            prompt,
            options,
            correct_index,
            explanation: (!hints.is_empty()).then(|| hints.join("\n")),
            handler,
        })
    }

    fn script(&mut self) -> Result<ResponseHandler, ParseError> {
        let start = self.pos;
        let close = (start..self.lines.len())
            .find(|&i| self.lines[i].contains("</script>"))
            .ok_or_else(|| self.error(start, MalformedBlock::UnterminatedScript))?;

        let joined = self.lines[start..=close].join("\n");
        let body_start = joined.find('>').map_or(0, |i| i + 1);
        let body_end = joined[body_start..]
            .find("</script>")
            .map_or(joined.len(), |i| body_start + i);
        self.pos = close + 1;

        ResponseHandler::parse(&joined[body_start..body_end]).map_err(|kind| self.error(start, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Feedback;

    const NUGGET: &str = r#"<!--
author: Course Team
version: 1.0
-->

# Normality Check

Statistical tests often assume normal data.

## Shapiro-Wilk

```r
# not a heading
shapiro.test(x)
```

{{1}}
The null hypothesis is normality.

{{2}}
*****
More detail

```r
qqnorm(x)
```
*****

{{3}} Inline fragment
continues here.

## Quiz

**Question 4:** The test returns p = 0.23. What does this mean?

[(X)] Data is normally distributed (p > 0.05)
[( )] Data is not normally distributed
[( )] The sample is too small
[( )] The test failed
[[?]] A large p-value gives no evidence against normality.
"#;

    #[test]
    fn test_parse_sections() {
        let nugget = parse_nugget(NUGGET).unwrap();
        assert_eq!(nugget.title, "Normality Check");

        let titles: Vec<_> = nugget.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Normality Check", "Shapiro-Wilk", "Quiz"]);
        assert_eq!(nugget.sections[1].level, 2);
    }

    #[test]
    fn test_code_fence_is_opaque() {
        let nugget = parse_nugget(NUGGET).unwrap();
        match &nugget.sections[1].blocks[0] {
            Block::Code { info, code } => {
                assert_eq!(info, "r");
                assert_eq!(code, "# not a heading\nshapiro.test(x)");
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_fragment_forms() {
        let nugget = parse_nugget(NUGGET).unwrap();
        let section = &nugget.sections[1];
        assert_eq!(section.fragment_group().markers(), &[1, 2, 3]);

        let fragments: Vec<_> = section
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Fragment(f) => Some(f),
                _ => None,
            })
            .collect();

        assert_eq!(
            fragments[0].blocks,
            vec![Block::Text {
                text: "The null hypothesis is normality.".to_string()
            }]
        );
        assert_eq!(fragments[1].blocks.len(), 2);
        assert!(matches!(fragments[1].blocks[1], Block::Code { .. }));
        assert_eq!(
            fragments[2].blocks,
            vec![Block::Text {
                text: "Inline fragment\ncontinues here.".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_quiz_with_explanation() {
        let nugget = parse_nugget(NUGGET).unwrap();
        let quiz = nugget.quiz(2, 0).unwrap();
        assert_eq!(
            quiz.prompt,
            "**Question 4:** The test returns p = 0.23. What does this mean?"
        );
        assert_eq!(quiz.options.len(), 4);
        assert_eq!(quiz.correct_index, 0);
        assert_eq!(quiz.correct_option(), Some("Data is normally distributed (p > 0.05)"));
        assert_eq!(
            quiz.feedback(),
            Feedback::Explanation("A large p-value gives no evidence against normality.")
        );
    }

    #[test]
    fn test_parse_quiz_with_script() {
        let text = "Which ANOVA?\n\n\
                    [( )] Classic\n\
                    [(X)] Welch\n\
                    <script>\n\
                    if (\"@input\" == 1) { send.lia(\"Right\") } else { send.lia(\"Wrong\") }\n\
                    </script>\n";
        let quiz = parse_quiz_block(text).unwrap();
        let handler = quiz.handler.as_ref().unwrap();
        assert_eq!(handler.expected, Some(1));
        assert_eq!(handler.on_match, "Right");
        assert_eq!(handler.on_mismatch, "Wrong");
        assert!(handler.script.starts_with('\n'));
    }

    #[test]
    fn test_missing_correct_option() {
        let err = parse_nugget("# T\n\nQ?\n\n[( )] a\n[( )] b\n").unwrap_err();
        assert_eq!(err.line, 5);
        assert_eq!(err.kind, MalformedBlock::MissingCorrectOption);
    }

    #[test]
    fn test_multiple_correct_options() {
        let err = parse_quiz_block("[(X)] a\n[(x)] b\n[( )] c").unwrap_err();
        assert_eq!(err.kind, MalformedBlock::MultipleCorrectOptions { count: 2 });
    }

    #[test]
    fn test_orphan_hint() {
        let err = parse_nugget("# T\n\n[[?]] lonely hint\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, MalformedBlock::OrphanHint);
    }

    #[test]
    fn test_unterminated_fragment() {
        let err = parse_nugget("# T\n{{1}}\n*****\nnever closed\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, MalformedBlock::UnterminatedFragment);
    }

    #[test]
    fn test_unterminated_script() {
        let err = parse_quiz_block("[(X)] a\n[( )] b\n<script>\nsend.lia('x')\n").unwrap_err();
        assert_eq!(err.kind, MalformedBlock::UnterminatedScript);
    }

    #[test]
    fn test_handler_without_dispatch() {
        let err = parse_quiz_block("[(X)] a\n[( )] b\n<script>let x = 1;</script>").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, MalformedBlock::HandlerWithoutDispatch);
    }

    #[test]
    fn test_no_options() {
        let err = parse_quiz_block("just prose").unwrap_err();
        assert_eq!(err.kind, MalformedBlock::NoOptions);
    }

    #[test]
    fn test_quiz_block_literal_holds_one_block() {
        let err = parse_quiz_block("Q1?\n\n[(X)] a\n[( )] b\n\nQ2?\n\n[( )] c\n[(X)] d\n").unwrap_err();
        assert_eq!(err.kind, MalformedBlock::ExtraContent);

        let err = parse_quiz_block("[(X)] a\n[( )] b\n\ntrailing prose\n").unwrap_err();
        assert_eq!(err.kind, MalformedBlock::ExtraContent);

        let err = parse_quiz_block("intro\n\n```\ncode\n```\n[(X)] a\n[( )] b\n").unwrap_err();
        assert_eq!(err.kind, MalformedBlock::ExtraContent);
    }

    #[test]
    fn test_handler_with_computed_dispatch() {
        let nugget = parse_nugget(
            "# T\n\nSame?\n\n[(X)] yes\n[( )] no\n\
             <script>let msg = \"@input\" == 0 ? \"yes\" : \"no\";\nsend.lia(msg)</script>\n",
        )
        .unwrap();
        let quiz = nugget.quiz(0, 0).unwrap();
        assert!(quiz.handler.is_some());
        assert_eq!(quiz.feedback(), Feedback::Silent);
    }

    #[test]
    fn test_quiz_block_round_trip() {
        let original = "**Question 3:** Variances differ. What now?\n\n\
                        [( )] Run a classic ANOVA anyway\n\
                        [(X)] Use Welch's ANOVA instead\n\
                        [( )] Drop the smallest group\n\
                        [( )] Log-transform the groups\n\
                        [[?]] Welch's ANOVA does not assume equal variances.\n\
                        [[?]] See oneway.test() in R.\n";

        let quiz = parse_quiz_block(original).unwrap();
        let reparsed = parse_quiz_block(&quiz.to_string()).unwrap();

        assert_eq!(reparsed, quiz);
        assert_eq!(quiz.to_string(), original);
    }

    #[test]
    fn test_round_trip_with_handler() {
        let original = "[(X)] yes\n[( )] no\n<script>send.lia(\"ok\"); send.lia(\"nope\")</script>\n";
        let quiz = parse_quiz_block(original).unwrap();
        assert_eq!(quiz.to_string(), original);
    }

    #[test]
    fn test_preamble_without_content_is_dropped() {
        let nugget = parse_nugget("<!-- meta -->\n\n# Only\ntext\n").unwrap();
        assert_eq!(nugget.sections.len(), 1);
        assert_eq!(nugget.sections[0].title, "Only");
    }

    #[test]
    fn test_heading_rules() {
        assert_eq!(heading("## Title"), Some((2, "Title")));
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("####### seven"), None);
        assert_eq!(heading("    # indented code"), None);
    }

    #[test]
    fn test_fragment_marker_forms() {
        assert_eq!(fragment_marker("{{2}}"), Some((2, "")));
        assert_eq!(fragment_marker("{{0}} shown"), Some((0, "shown")));
        assert_eq!(fragment_marker("{{1-3}}"), None);
        assert_eq!(fragment_marker("{{x}}"), None);
    }
}
