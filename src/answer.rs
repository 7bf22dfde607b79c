//! Course lookup answers: which fields the user asked for, and how the
//! shortlisted courses are rendered.
//!
//! Rendering never fails. Missing values become `N/A`, and a price or lesson
//! count that is not a number turns the derived total into `N/A`.

use crate::catalog::{CourseRecord, Curriculum};
use crate::config::{AnswerSettings, AnswerStyle};
use crate::retrieval::RankedResult;
use regex::Regex;
use std::sync::OnceLock;

/// Placeholder for any value that is missing or cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// First line of every non-empty lookup answer.
pub const RESULTS_HEADER: &str = "Here are the relevant courses:";

/// Answer when no course is close enough to the query.
pub const NO_MATCHES: &str = "Sorry, I couldn't find any courses matching that query.";

/// Currency used for totals when the listed price carries no symbol.
const DEFAULT_CURRENCY: &str = "$";

/// Matches a listed price like "$20", "€ 12.50", "20.", ".5" or "1e2".
fn price_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<symbol>[$€£¥₹])?\s*(?P<amount>(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)\s*$")
            .expect("Invalid price regex")
    })
}

/// Course fields a query explicitly asks about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestedFields {
    pub curriculum: bool,
    pub price: bool,
    pub link: bool,
    pub description: bool,
}

impl RequestedFields {
    /// Detect field keywords in a query (case-insensitive substring match).
    pub fn from_query(query: &str) -> Self {
        let query = query.to_lowercase();
        Self {
            curriculum: query.contains("curriculum"),
            price: query.contains("price"),
            link: query.contains("link"),
            description: query.contains("description"),
        }
    }

    /// No specific field was requested, so every section is shown.
    pub fn show_all(&self) -> bool {
        !(self.curriculum || self.price || self.link || self.description)
    }

    pub fn shows_description(&self) -> bool {
        self.show_all() || self.description
    }

    pub fn shows_price(&self) -> bool {
        self.show_all() || self.price
    }

    pub fn shows_curriculum(&self) -> bool {
        self.show_all() || self.curriculum
    }
}

/// Per-lesson price times lesson count, formatted with two decimals.
///
/// Returns `None` when either value is missing or not a number.
pub fn total_price(price: Option<&str>, lessons: Option<&str>) -> Option<String> {
    let caps = price_regex().captures(price?)?;
    let amount: f64 = caps.name("amount")?.as_str().parse().ok()?;
    let symbol = caps.name("symbol").map_or(DEFAULT_CURRENCY, |m| m.as_str());

    let lessons: f64 = lessons?.trim().parse().ok()?;
    let total = amount * lessons;
    if !total.is_finite() {
        return None;
    }

    Some(format!("{}{:.2}", symbol, total))
}

/// Display values of one course, with placeholders already applied.
struct CourseView {
    name: String,
    link: String,
    lessons: String,
    total_price: String,
    description: String,
    price: String,
    curriculum: String,
}

impl CourseView {
    fn new(course: &CourseRecord) -> Self {
        let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            name: course.name.as_deref().unwrap_or(NOT_AVAILABLE).to_uppercase(),
            link: or_na(&course.link),
            lessons: or_na(&course.lessons),
            total_price: total_price(course.price.as_deref(), course.lessons.as_deref())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            description: or_na(&course.description),
            price: or_na(&course.price),
            curriculum: course
                .curriculum
                .as_ref()
                .map(Curriculum::display)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// Renders ranked courses into a single answer.
#[derive(Debug, Clone)]
pub struct AnswerFormatter {
    style: AnswerStyle,
    book_demo_url: String,
    contact_url: String,
    show_distance: bool,
}

impl Default for AnswerFormatter {
    fn default() -> Self {
        Self::new(&AnswerSettings::default())
    }
}

impl AnswerFormatter {
    /// Create a formatter from configuration.
    pub fn new(settings: &AnswerSettings) -> Self {
        Self {
            style: settings.style,
            book_demo_url: settings.book_demo_url.clone(),
            contact_url: settings.contact_url.clone(),
            show_distance: settings.show_distance,
        }
    }

    /// Render the answer for `query` from its ranked results.
    pub fn format(&self, query: &str, results: &[RankedResult]) -> String {
        if results.is_empty() {
            return NO_MATCHES.to_string();
        }

        let fields = RequestedFields::from_query(query);

        match self.style {
            AnswerStyle::Markdown => {
                let mut sections = vec![RESULTS_HEADER.to_string()];
                sections.extend(results.iter().map(|r| self.markdown_card(r, fields)));
                sections.join("\n\n")
            }
            AnswerStyle::Html => {
                let mut sections = vec![format!(
                    "<div style='font-weight:bold;margin-bottom:10px;'>{}</div>",
                    RESULTS_HEADER
                )];
                sections.extend(results.iter().map(|r| self.html_card(r, fields)));
                sections.join("\n")
            }
        }
    }

    fn markdown_card(&self, result: &RankedResult, fields: RequestedFields) -> String {
        let view = CourseView::new(&result.course);

        let mut lines = vec![
            format!("**{}**", view.name),
            format!("Link: {}", view.link),
            format!("Number of Lessons: {}", view.lessons),
            format!("Total Price: {}", view.total_price),
        ];
        if fields.shows_description() {
            lines.push(format!("Description: {}", view.description));
        }
        if fields.shows_price() {
            lines.push(format!("Price: {}", view.price));
        }
        if fields.shows_curriculum() {
            lines.push(format!("Curriculum: {}", view.curriculum));
        }
        lines.push(format!(
            "Actions: [Book a Free Demo]({}) | [Enquire Now]({})",
            self.book_demo_url, self.contact_url
        ));
        if self.show_distance {
            lines.push(format!("Score: {:.2}", result.distance));
        }

        lines.join("\n")
    }

    fn html_card(&self, result: &RankedResult, fields: RequestedFields) -> String {
        let view = CourseView::new(&result.course);
        let link = escape_html(&view.link);

        let mut card = String::from("<div class=\"course-card\">\n");
        card.push_str(&format!("  <h2><strong>{}</strong></h2>\n", escape_html(&view.name)));
        card.push_str(&format!(
            "  <p><strong>Link:</strong> <a href=\"{0}\" target=\"_blank\">{0}</a></p>\n",
            link
        ));
        card.push_str(&format!(
            "  <p><strong>Number of Lessons:</strong> {}</p>\n",
            escape_html(&view.lessons)
        ));
        card.push_str(&format!(
            "  <p><strong>Total Price:</strong> {}</p>\n",
            escape_html(&view.total_price)
        ));
        if fields.shows_description() {
            card.push_str(&format!(
                "  <p><strong>Description:</strong> {}</p>\n",
                escape_html(&view.description)
            ));
        }
        if fields.shows_price() {
            card.push_str(&format!("  <p><strong>Price:</strong> {}</p>\n", escape_html(&view.price)));
        }
        if fields.shows_curriculum() {
            card.push_str(&format!(
                "  <p><strong>Curriculum:</strong> {}</p>\n",
                escape_html(&view.curriculum)
            ));
        }
        card.push_str(&format!(
            "  <p><strong>Actions:</strong> <a href=\"{}\" target=\"_blank\">Book a Free Demo</a> | <a href=\"{}\" target=\"_blank\">Enquire Now</a></p>\n",
            escape_html(&self.book_demo_url),
            escape_html(&self.contact_url)
        ));
        if self.show_distance {
            card.push_str(&format!("  <p><em>Score:</em> {:.2}</p>\n", result.distance));
        }
        card.push_str("</div>");

        card
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_science() -> RankedResult {
        RankedResult {
            course_id: 0,
            course: CourseRecord {
                name: Some("Data Science".to_string()),
                description: Some("Learn to work with data.".to_string()),
                price: Some("$20".to_string()),
                lessons: Some("10".to_string()),
                link: Some("https://brainlox.com/courses/data-science".to_string()),
                curriculum: Some(Curriculum::Topics(vec![
                    "Intro".to_string(),
                    "Stats".to_string(),
                    "ML".to_string(),
                ])),
                ..Default::default()
            },
            distance: 0.42,
        }
    }

    #[test]
    fn test_total_price() {
        assert_eq!(total_price(Some("$20"), Some("10")).as_deref(), Some("$200.00"));
        assert_eq!(total_price(Some(" $ 12.5 "), Some("4")).as_deref(), Some("$50.00"));
        assert_eq!(total_price(Some("€15"), Some("3")).as_deref(), Some("€45.00"));
        assert_eq!(total_price(Some("30"), Some(" 2 ")).as_deref(), Some("$60.00"));
    }

    #[test]
    fn test_total_price_loose_numbers() {
        assert_eq!(total_price(Some("$20."), Some("2")).as_deref(), Some("$40.00"));
        assert_eq!(total_price(Some(".5"), Some("10")).as_deref(), Some("$5.00"));
        assert_eq!(total_price(Some("1e2"), Some("3")).as_deref(), Some("$300.00"));
        assert_eq!(total_price(Some("$."), Some("3")), None);
    }

    #[test]
    fn test_total_price_not_available() {
        assert_eq!(total_price(Some("Free"), Some("10")), None);
        assert_eq!(total_price(Some("$20"), Some("N/A")), None);
        assert_eq!(total_price(None, Some("10")), None);
        assert_eq!(total_price(Some("$20"), None), None);
        assert_eq!(total_price(Some("Free or Not Listed"), Some("8")), None);
        assert_eq!(total_price(Some("$20"), Some("inf")), None);
    }

    #[test]
    fn test_requested_fields() {
        let fields = RequestedFields::from_query("Tell me the CURRICULUM for data science");
        assert!(fields.curriculum);
        assert!(!fields.show_all());
        assert!(fields.shows_curriculum());
        assert!(!fields.shows_price());
        assert!(!fields.shows_description());

        assert!(RequestedFields::from_query("python courses").show_all());
    }

    #[test]
    fn test_format_all_fields() {
        let answer = AnswerFormatter::default().format("data science course", &[data_science()]);

        assert!(answer.starts_with(RESULTS_HEADER));
        assert!(answer.contains("**DATA SCIENCE**"));
        assert!(answer.contains("Link: https://brainlox.com/courses/data-science"));
        assert!(answer.contains("Number of Lessons: 10"));
        assert!(answer.contains("Total Price: $200.00"));
        assert!(answer.contains("Description: Learn to work with data."));
        assert!(answer.contains("Price: $20"));
        assert!(answer.contains("Curriculum: Intro, Stats, ML"));
        assert!(answer.contains("https://brainlox.com/book-free-demo"));
        assert!(answer.contains("https://brainlox.com/contact"));
        assert!(!answer.contains("Score"));
    }

    #[test]
    fn test_format_only_requested_fields() {
        let answer = AnswerFormatter::default()
            .format("tell me the curriculum for data science course", &[data_science()]);

        assert!(answer.contains("Curriculum: Intro, Stats, ML"));
        assert!(!answer.contains("Description:"));
        assert!(!answer.contains("\nPrice:"));
        // Always-on sections stay
        assert!(answer.contains("Total Price: $200.00"));
        assert!(answer.contains("Link:"));
    }

    #[test]
    fn test_format_placeholders() {
        let result = RankedResult {
            course_id: 1,
            course: CourseRecord {
                curriculum: Some(Curriculum::Unavailable("No curriculum available".to_string())),
                price: Some("Free".to_string()),
                ..Default::default()
            },
            distance: 0.1,
        };

        let answer = AnswerFormatter::default().format("course", &[result]);
        assert!(answer.contains("**N/A**"));
        assert!(answer.contains("Link: N/A"));
        assert!(answer.contains("Total Price: N/A"));
        assert!(answer.contains("Price: Free"));
        assert!(answer.contains("Curriculum: No curriculum available"));
    }

    #[test]
    fn test_format_empty_results() {
        assert_eq!(AnswerFormatter::default().format("python course", &[]), NO_MATCHES);
    }

    #[test]
    fn test_format_is_deterministic() {
        let formatter = AnswerFormatter::default();
        let results = vec![data_science(), data_science()];
        assert_eq!(formatter.format("course", &results), formatter.format("course", &results));
    }

    #[test]
    fn test_html_style_escapes_and_scores() {
        let settings = AnswerSettings {
            style: AnswerStyle::Html,
            show_distance: true,
            ..Default::default()
        };
        let mut result = data_science();
        result.course.description = Some("<script>alert(1)</script>".to_string());

        let answer = AnswerFormatter::new(&settings).format("course", &[result]);
        assert!(answer.contains("<div class=\"course-card\">"));
        assert!(answer.contains("<h2><strong>DATA SCIENCE</strong></h2>"));
        assert!(answer.contains("&lt;script&gt;"));
        assert!(!answer.contains("<script>"));
        assert!(answer.contains("<em>Score:</em> 0.42"));
    }
}
