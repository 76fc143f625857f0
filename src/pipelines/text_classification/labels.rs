use std::fmt::Display;

use serde::{Serialize, Serializer};

/// The closed set of flairs the model predicts, in class index order
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Flair {
    /// `AskIndia`
    AskIndia,
    /// `Business/Finance`
    BusinessFinance,
    /// `CAA-NRC`
    CaaNrc,
    /// `Coronavirus`
    Coronavirus,
    /// `Demonetization`
    Demonetization,
    /// `Food`
    Food,
    /// `Non-Political`
    NonPolitical,
    /// `Photography`
    Photography,
    /// `Policy/Economy`
    PolicyEconomy,
    /// `Politics`
    Politics,
    /// `Scheduled`
    Scheduled,
    /// `Science/Technology`
    ScienceTechnology,
    /// `Sports`
    Sports,
    /// `[R]eddiquette`
    Reddiquette,
}

/// Every flair, indexed by class id
pub static FLAIRS: [Flair; 14] = [
    Flair::AskIndia,
    Flair::BusinessFinance,
    Flair::CaaNrc,
    Flair::Coronavirus,
    Flair::Demonetization,
    Flair::Food,
    Flair::NonPolitical,
    Flair::Photography,
    Flair::PolicyEconomy,
    Flair::Politics,
    Flair::Scheduled,
    Flair::ScienceTechnology,
    Flair::Sports,
    Flair::Reddiquette,
];

impl Flair {
    /// Resolve a class id from the model output
    pub fn from_index(index: usize) -> Option<Self> {
        FLAIRS.get(index).copied()
    }

    /// The flair text as it appears on the subreddit
    pub fn as_str(&self) -> &'static str {
        match self {
            Flair::AskIndia => "AskIndia",
            Flair::BusinessFinance => "Business/Finance",
            Flair::CaaNrc => "CAA-NRC",
            Flair::Coronavirus => "Coronavirus",
            Flair::Demonetization => "Demonetization",
            Flair::Food => "Food",
            Flair::NonPolitical => "Non-Political",
            Flair::Photography => "Photography",
            Flair::PolicyEconomy => "Policy/Economy",
            Flair::Politics => "Politics",
            Flair::Scheduled => "Scheduled",
            Flair::ScienceTechnology => "Science/Technology",
            Flair::Sports => "Sports",
            Flair::Reddiquette => "[R]eddiquette",
        }
    }
}

impl Display for Flair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Flair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn class_ids_follow_the_label_table() {
        assert_eq!(Flair::from_index(0), Some(Flair::AskIndia));
        assert_eq!(Flair::from_index(8).map(|f| f.as_str()), Some("Policy/Economy"));
        assert_eq!(Flair::from_index(13).map(|f| f.as_str()), Some("[R]eddiquette"));
        assert_eq!(Flair::from_index(14), None);

        for (index, flair) in FLAIRS.iter().enumerate() {
            assert_eq!(Flair::from_index(index), Some(*flair));
        }
    }

    #[test]
    fn flair_text_is_unique() {
        let mut names: Vec<&str> = FLAIRS.iter().map(|flair| flair.as_str()).collect();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), 14);
    }

    #[test]
    fn serializes_as_flair_text() {
        let json = serde_json::to_string(&Flair::ScienceTechnology).unwrap();

        assert_eq!(json, "\"Science/Technology\"");
    }
}
