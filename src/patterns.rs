//! Recognized title and heading patterns.
//!
//! The pattern set is kept as declarative tables (pattern source → role)
//! compiled once into a [`PatternLibrary`], so new scripts or locales are
//! added as rows, not as branches in the extraction logic. Exclusion rows
//! always take priority over inclusion rows.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Hierarchy role implied by a heading prefix shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRole {
    /// Top-level chapter marker ("第三章", "Chapter 4", "7 标题").
    Primary,
    /// Nested or sub-section marker ("1.2", "第二节", "Section 3").
    Secondary,
}

/// Heading prefixes and the role their shape implies.
const CHAPTER_PATTERNS: &[(&str, HeadingRole)] = &[
    (r"^第[零一二三四五六七八九十百千万0-9]+章", HeadingRole::Primary),
    (r"^第[零一二三四五六七八九十百千万0-9]+节", HeadingRole::Secondary),
    (r"(?i)^Chapter\s*\d+", HeadingRole::Primary),
    (r"(?i)^Section\s*\d+", HeadingRole::Secondary),
    (r"(?i)^Part\s*\d+", HeadingRole::Primary),
    (r"(?i)^Volume\s*\d+", HeadingRole::Primary),
    (r"(?i)^Unit\s*\d+", HeadingRole::Primary),
    (r"(?i)^Module\s*\d+", HeadingRole::Primary),
    // Dotted decimal numbering ("1.2", "3.4.1").
    (r"^\d+(?:\.\d+)+", HeadingRole::Secondary),
    // Bare numeral with punctuation ("1." / "3：") or a space ("7 标题").
    (r"^\d+\s*[:：.]", HeadingRole::Primary),
    (r"^\d+\s+", HeadingRole::Primary),
];

/// Lines matching any of these are never headings, whatever else they match.
const EXCLUSION_PATTERNS: &[&str] = &[
    // Copyright lines ("©2024 …").
    r"©\s*\d{4}",
    // Page-count lines ("738 页").
    r"\d+\s*页",
    // Bare numbers and number-plus-punctuation fragments.
    r"^\d+$",
    r"^\d+\s*[^\w\s]+$",
    // Front/back-matter markers in Latin script, matched as whole words.
    r"(?i)\b(?:appendices|appendix|preface|foreword|bibliography|index|copyright|acknowledge?ments)\b",
];

/// Front/back-matter keywords excluded by substring match.
const EXCLUSION_KEYWORDS: &[&str] = &[
    "版权", "前言", "序言", "致谢", "附录", "参考文献", "索引", "目录", "说明", "序章", "楔子",
    "后记",
];

/// Book titles quoted in 《》 with a 2-4 character author name adjacent.
const TITLE_PATTERN: &str = r"(\p{Han}{2,4})《([^《》]+)》|《([^《》]+)》(\p{Han}{2,4}?)";

/// Dot leaders with an optional trailing page number ("绪论 ......12").
const DOT_LEADER_PATTERN: &str = r"[.…·]{2,}\s*\d*\s*$";

/// Writing system targeted by the script-ratio heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetScript {
    #[default]
    Han,
    Latin,
}

impl TargetScript {
    /// Whether `c` belongs to this script.
    pub fn contains(self, c: char) -> bool {
        match self {
            TargetScript::Han => ('\u{4e00}'..='\u{9fff}').contains(&c),
            TargetScript::Latin => c.is_ascii_alphabetic(),
        }
    }

    /// Fraction of characters in `text` belonging to this script.
    pub fn ratio(self, text: &str) -> f64 {
        let total = text.chars().count();
        if total == 0 {
            return 0.0;
        }
        let hits = text.chars().filter(|&c| self.contains(c)).count();
        hits as f64 / total as f64
    }
}

/// A heading prefix recognized at the start of a line.
#[derive(Debug, Clone, Copy)]
pub struct HeadingMatch<'a> {
    /// The numbering prefix ("第三章", "1.2").
    pub prefix: &'a str,
    /// Remainder of the line after the prefix and its separator.
    pub rest: &'a str,
    /// Role resolved across all matching rows.
    pub role: HeadingRole,
}

/// A book title quoted in the source text, with its adjacent author name.
#[derive(Debug, Clone, Copy)]
pub struct TitleMatch<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
}

/// Compiled pattern tables.
pub struct PatternLibrary {
    chapter: Vec<(Regex, HeadingRole)>,
    exclusion: Vec<Regex>,
    title: Regex,
    dot_leader: Regex,
}

impl PatternLibrary {
    /// Compile the pattern tables.
    pub fn new() -> Self {
        let chapter = CHAPTER_PATTERNS
            .iter()
            .map(|(source, role)| (compile(source), *role))
            .collect();
        let exclusion = EXCLUSION_PATTERNS.iter().map(|source| compile(source)).collect();

        Self {
            chapter,
            exclusion,
            title: compile(TITLE_PATTERN),
            dot_leader: compile(DOT_LEADER_PATTERN),
        }
    }

    /// Whether the line matches an exclusion pattern or keyword.
    ///
    /// Exclusion wins over any heading match on the same line.
    pub fn is_excluded(&self, line: &str) -> bool {
        if self.exclusion.iter().any(|re| re.is_match(line)) {
            return true;
        }
        EXCLUSION_KEYWORDS.iter().any(|keyword| line.contains(keyword))
    }

    /// Match a heading prefix at the start of `line`.
    ///
    /// Every row is tried: the longest matching prefix is kept, and if any
    /// matching row is a sub-section shape the role resolves to `Secondary`
    /// (a marker that reads both ways must not be over-counted as a chapter).
    pub fn match_heading<'a>(&self, line: &'a str) -> Option<HeadingMatch<'a>> {
        let mut end = 0;
        let mut role = HeadingRole::Primary;
        let mut matched = false;

        for (re, row_role) in &self.chapter {
            if let Some(m) = re.find(line) {
                matched = true;
                end = end.max(m.end());
                if *row_role == HeadingRole::Secondary {
                    role = HeadingRole::Secondary;
                }
            }
        }

        if !matched {
            return None;
        }

        let prefix = line[..end].trim_end();
        let rest = line[end..].trim_start_matches([':', '：']).trim_start();
        Some(HeadingMatch { prefix, rest, role })
    }

    /// All quoted book titles in `text`, in order of appearance.
    pub fn book_titles<'a>(&self, text: &'a str) -> Vec<TitleMatch<'a>> {
        self.title
            .captures_iter(text)
            .filter_map(|cap| {
                if let Some(title) = cap.get(2) {
                    Some(TitleMatch {
                        title: title.as_str(),
                        author: cap.get(1).map(|m| m.as_str()),
                    })
                } else {
                    cap.get(3).map(|title| TitleMatch {
                        title: title.as_str(),
                        author: cap.get(4).map(|m| m.as_str()),
                    })
                }
            })
            .collect()
    }

    /// Strip a trailing dot leader and page number from a heading title.
    pub fn trim_leader<'a>(&self, title: &'a str) -> &'a str {
        match self.dot_leader.find(title) {
            Some(m) => title[..m.start()].trim_end(),
            None => title,
        }
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(source: &str) -> Regex {
    Regex::new(source).expect("pattern table entry must compile")
}

/// Convert a CJK numeral (一, 十, 二十一, ...) to an integer.
pub fn cjk_numeral_to_int(s: &str) -> Option<u32> {
    fn digit(c: char) -> Option<u32> {
        "零一二三四五六七八九".chars().position(|d| d == c).map(|n| n as u32)
    }

    if s.is_empty() {
        return None;
    }

    if let Some((tens, ones)) = s.split_once('十') {
        let tens = if tens.is_empty() {
            1
        } else {
            digit(tens.chars().next()?)?
        };
        let ones = match ones.chars().next() {
            Some(c) => digit(c)?,
            None => 0,
        };
        return Some(tens * 10 + ones);
    }

    digit(s.chars().next()?)
}

/// Parse the heading number out of a prefix, Arabic numerals first.
pub fn parse_heading_number(prefix: &str) -> Option<u32> {
    let digits: String = prefix
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if let Ok(n) = digits.parse() {
        return Some(n);
    }

    let is_cjk_digit = |c: char| "零一二三四五六七八九十".contains(c);
    let numerals: String = prefix
        .chars()
        .skip_while(|&c| !is_cjk_digit(c))
        .take_while(|&c| is_cjk_digit(c))
        .collect();
    cjk_numeral_to_int(&numerals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_numerals() {
        assert_eq!(cjk_numeral_to_int("一"), Some(1));
        assert_eq!(cjk_numeral_to_int("九"), Some(9));
        assert_eq!(cjk_numeral_to_int("十"), Some(10));
        assert_eq!(cjk_numeral_to_int("十一"), Some(11));
        assert_eq!(cjk_numeral_to_int("二十"), Some(20));
        assert_eq!(cjk_numeral_to_int("二十一"), Some(21));
        assert_eq!(cjk_numeral_to_int(""), None);
        assert_eq!(cjk_numeral_to_int("abc"), None);
    }

    #[test]
    fn test_parse_heading_number() {
        assert_eq!(parse_heading_number("第3章"), Some(3));
        assert_eq!(parse_heading_number("第十二章"), Some(12));
        assert_eq!(parse_heading_number("Chapter 7"), Some(7));
        assert_eq!(parse_heading_number("1.2"), Some(1));
        assert_eq!(parse_heading_number("绪论"), None);
    }

    #[test]
    fn test_primary_heading_shapes() {
        let lib = PatternLibrary::new();

        for line in ["第一章 绪论", "Chapter 3 Basics", "Part 2 Advanced", "7 机器学习"] {
            let m = lib.match_heading(line).unwrap();
            assert_eq!(m.role, HeadingRole::Primary, "line: {line}");
        }
    }

    #[test]
    fn test_secondary_heading_shapes() {
        let lib = PatternLibrary::new();

        for line in ["第二节 感知机", "Section 4: Details", "2.3 卷积网络"] {
            let m = lib.match_heading(line).unwrap();
            assert_eq!(m.role, HeadingRole::Secondary, "line: {line}");
        }
    }

    #[test]
    fn test_ambiguous_marker_resolves_to_secondary() {
        let lib = PatternLibrary::new();

        // "1.2" matches both the bare "1." shape and the dotted shape.
        let m = lib.match_heading("1.2 概述").unwrap();
        assert_eq!(m.role, HeadingRole::Secondary);
        assert_eq!(m.prefix, "1.2");
        assert_eq!(m.rest, "概述");

        // "1." alone only matches the bare-numeral shape.
        let m = lib.match_heading("1. 概述").unwrap();
        assert_eq!(m.role, HeadingRole::Primary);
    }

    #[test]
    fn test_prefix_and_rest_split() {
        let lib = PatternLibrary::new();

        let m = lib.match_heading("第三章：神经网络基础").unwrap();
        assert_eq!(m.prefix, "第三章");
        assert_eq!(m.rest, "神经网络基础");

        let m = lib.match_heading("Chapter 2 Linear Models").unwrap();
        assert_eq!(m.prefix, "Chapter 2");
        assert_eq!(m.rest, "Linear Models");
    }

    #[test]
    fn test_non_heading_lines_do_not_match() {
        let lib = PatternLibrary::new();
        assert!(lib.match_heading("这是一段普通的介绍文字").is_none());
        assert!(lib.match_heading("").is_none());
    }

    #[test]
    fn test_exclusion_patterns() {
        let lib = PatternLibrary::new();
        assert!(lib.is_excluded("©2024 Example Press"));
        assert!(lib.is_excluded("共 738 页"));
        assert!(lib.is_excluded("42"));
        assert!(lib.is_excluded("3."));
        assert!(lib.is_excluded("附录A 参考文献"));
        assert!(lib.is_excluded("前言"));
        assert!(lib.is_excluded("Appendix B: Notation"));

        assert!(!lib.is_excluded("第一章 绪论"));
        assert!(!lib.is_excluded("Chapter 2 Linear Models"));
    }

    #[test]
    fn test_book_titles() {
        let lib = PatternLibrary::new();
        let text = "张三丰《高等数学》是经典教材，《线性代数》李四也常被推荐。";

        let matches = lib.book_titles(text);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].title, "高等数学");
        assert_eq!(matches[0].author, Some("张三丰"));
        assert_eq!(matches[1].title, "线性代数");
        assert_eq!(matches[1].author, Some("李四"));
    }

    #[test]
    fn test_unquoted_titles_do_not_match() {
        let lib = PatternLibrary::new();
        assert!(lib.book_titles("《孤立的书名没有作者名相邻》").is_empty());
        assert!(lib.book_titles("plain latin text only").is_empty());
    }

    #[test]
    fn test_trim_leader() {
        let lib = PatternLibrary::new();
        assert_eq!(lib.trim_leader("绪论 ......12"), "绪论");
        assert_eq!(lib.trim_leader("绪论……3"), "绪论");
        assert_eq!(lib.trim_leader("绪论"), "绪论");
        assert_eq!(lib.trim_leader("Windows 95 编程"), "Windows 95 编程");
    }

    #[test]
    fn test_script_ratio() {
        assert!(TargetScript::Han.ratio("神经网络基础") > 0.99);
        assert_eq!(TargetScript::Han.ratio("abc"), 0.0);
        assert_eq!(TargetScript::Han.ratio(""), 0.0);
        assert!(TargetScript::Latin.ratio("Linear Models") > 0.8);

        // Half Han, half Latin noise.
        let ratio = TargetScript::Han.ratio("数据db");
        assert!((ratio - 0.5).abs() < 1e-9);
    }
}
