use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slide {
    pub title: &'static str,
    pub title_ar: &'static str,
    pub description: &'static str,
}

pub const SLIDES: [Slide; 6] = [
    Slide {
        title: "Welcome to Waqti",
        title_ar: "مرحباً بك في وقتي",
        description: "Exchange your time and skills with a community of professionals.",
    },
    Slide {
        title: "How Time Exchange Works",
        title_ar: "كيف يعمل تبادل الوقت",
        description: "Earn hours by helping others and spend them on the services you need.",
    },
    Slide {
        title: "Offer Your Services",
        title_ar: "قدم خدماتك",
        description: "List what you do best and set your rate in hours or dirhams.",
    },
    Slide {
        title: "Connect & Communicate",
        title_ar: "تواصل وتفاعل",
        description: "Message clients and freelancers directly to agree on the details.",
    },
    Slide {
        title: "Safe & Secure",
        title_ar: "آمن ومحمي",
        description: "Payments are held in escrow until the work is delivered.",
    },
    Slide {
        title: "Ready to Start?",
        title_ar: "جاهز للبدء؟",
        description: "Complete your profile and make your first exchange.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "slide", rename_all = "snake_case")]
pub enum WalkthroughState {
    Showing(usize),
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkthroughProgress {
    pub label: String,
    pub percent: u8,
}

/// Slide carousel shown to first-time visitors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Walkthrough {
    current: usize,
    completed: bool,
}

impl Walkthrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn slide(&self) -> &'static Slide {
        &SLIDES[self.current]
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn state(&self) -> WalkthroughState {
        if self.completed {
            WalkthroughState::Completed
        } else {
            WalkthroughState::Showing(self.current)
        }
    }

    /// Advance one slide; on the last slide this completes the walkthrough instead.
    pub fn next(&mut self) -> WalkthroughState {
        if self.current + 1 < SLIDES.len() {
            self.current += 1;
        } else {
            self.completed = true;
        }
        self.state()
    }

    pub fn previous(&mut self) -> WalkthroughState {
        self.current = self.current.saturating_sub(1);
        self.state()
    }

    pub fn skip(&mut self) -> WalkthroughState {
        self.completed = true;
        self.state()
    }

    pub fn progress(&self) -> WalkthroughProgress {
        let step = self.current + 1;
        let total = SLIDES.len();
        let percent = ((step as f64 / total as f64) * 100.0).round() as u8;
        WalkthroughProgress {
            label: format!("Step {step} of {total}"),
            percent,
        }
    }
}
