use derive_new::new;
use serde::Serialize;

use crate::{pipelines::text_classification::Flair, reddit::Submission};

static MAIN: &str = include_str!("../../templates/main.html");

static PREDICTED: &str = include_str!("../../templates/predicted.html");

/// Flair shown for posts that aren't tagged yet
pub static UNTAGGED: &str = "Untagged";

/// The lines of the result page
#[derive(Debug, Clone, Serialize, new)]
pub struct ResultPage {
    /// Headline
    pub result: String,

    /// The post title
    pub title: String,

    /// The predicted flair
    pub prediction: String,

    /// The flair the post actually has
    pub flair: String,
}

impl ResultPage {
    /// A successful prediction for a submission
    pub fn success(submission: &Submission, prediction: Flair) -> Self {
        Self::new(
            "Success!".to_string(),
            format!("Title: {}", submission.title),
            format!("Predicted flair: {}", prediction),
            format!(
                "Actual flair: {}",
                submission.flair.as_deref().unwrap_or(UNTAGGED)
            ),
        )
    }

    /// Shown whenever the URL can't be turned into a prediction
    pub fn failure() -> Self {
        Self::new(
            "Oops!".to_string(),
            "It seems that an error has occurred".to_string(),
            "You might've entered an invalid URL".to_string(),
            "Why don't we try again?".to_string(),
        )
    }
}

/// The parsed HTML pages
pub struct Templates {
    main: liquid::Template,
    predicted: liquid::Template,
}

impl Templates {
    /// Parse the bundled templates
    pub fn new() -> Result<Self, liquid::Error> {
        let parser = liquid::ParserBuilder::with_stdlib().build()?;

        Ok(Self {
            main: parser.parse(MAIN)?,
            predicted: parser.parse(PREDICTED)?,
        })
    }

    /// The URL entry page
    pub fn main(&self) -> Result<String, liquid::Error> {
        self.main.render(&liquid::Object::new())
    }

    /// The result page
    pub fn predicted(&self, page: &ResultPage) -> Result<String, liquid::Error> {
        self.predicted.render(&liquid::to_object(page)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn success_page_lists_both_flairs() {
        let submission = Submission::new("Budget 2021 explained".to_string(), None);
        let page = ResultPage::success(&submission, Flair::PolicyEconomy);

        assert_eq!(page.title, "Title: Budget 2021 explained");
        assert_eq!(page.prediction, "Predicted flair: Policy/Economy");
        assert_eq!(page.flair, "Actual flair: Untagged");
    }

    #[test]
    fn titles_are_escaped() {
        let templates = Templates::new().unwrap();
        let submission = Submission::new(
            "<script>alert(1)</script>".to_string(),
            Some("Politics".to_string()),
        );

        let html = templates
            .predicted(&ResultPage::success(&submission, Flair::Politics))
            .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Actual flair: Politics"));
    }

    #[test]
    fn main_page_has_both_forms() {
        let html = Templates::new().unwrap().main().unwrap();

        assert!(html.contains(r#"name="url""#));
        assert!(html.contains(r#"name="upload_file""#));
    }
}
