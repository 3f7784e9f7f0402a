use std::fmt;

/// 向导步骤（1..=7）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Journal = 1,
    Requirements = 2,
    AuthorInfo = 3,
    CoAuthors = 4,
    Uploads = 5,
    Metadata = 6,
    Review = 7,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::Journal,
        WizardStep::Requirements,
        WizardStep::AuthorInfo,
        WizardStep::CoAuthors,
        WizardStep::Uploads,
        WizardStep::Metadata,
        WizardStep::Review,
    ];

    pub const FIRST: WizardStep = WizardStep::Journal;
    pub const LAST: WizardStep = WizardStep::Review;

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_index(self.index().checked_sub(1)?)
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Journal => "Journal",
            WizardStep::Requirements => "Requirements",
            WizardStep::AuthorInfo => "Author Info",
            WizardStep::CoAuthors => "Co-Authors",
            WizardStep::Uploads => "Uploads",
            WizardStep::Metadata => "Metadata",
            WizardStep::Review => "Review",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index(), self.title())
    }
}
