use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

/// Domain assistants a chat request can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssistantKind {
    PlanMyTrip,
    CurrencyConverter,
    WhatToDo,
    VoiceTranslator,
    GeneralChat,
}

impl AssistantKind {
    pub const ALL: [AssistantKind; 5] = [
        AssistantKind::PlanMyTrip,
        AssistantKind::CurrencyConverter,
        AssistantKind::WhatToDo,
        AssistantKind::VoiceTranslator,
        AssistantKind::GeneralChat,
    ];

    /// URL path segment, e.g. `/plan-my-trip/chat`
    pub fn slug(&self) -> &'static str {
        match self {
            AssistantKind::PlanMyTrip => "plan-my-trip",
            AssistantKind::CurrencyConverter => "currency-converter",
            AssistantKind::WhatToDo => "what-to-do",
            AssistantKind::VoiceTranslator => "voice-translator",
            AssistantKind::GeneralChat => "general-chat",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssistantKind::PlanMyTrip => "Plan My Trip",
            AssistantKind::CurrencyConverter => "Currency Converter",
            AssistantKind::WhatToDo => "What To Do Today?",
            AssistantKind::VoiceTranslator => "Voice Translator",
            AssistantKind::GeneralChat => "General Chat",
        }
    }

    fn focus(&self) -> &'static str {
        match self {
            AssistantKind::PlanMyTrip => {
                "Build a customized Bali itinerary. Ask one clear question at a time \
                 (number of days, base area, interests, budget, special requirements), \
                 confirm what you extracted, then present the plan day by day."
            }
            AssistantKind::CurrencyConverter => {
                "Convert the user's currency to Indonesian Rupiah (IDR) and add a short \
                 practical note on what that amount buys in Bali."
            }
            AssistantKind::WhatToDo => {
                "Suggest what to do in Bali today based on the user's area, the time of \
                 day and the weather they describe."
            }
            AssistantKind::VoiceTranslator => {
                "Translate between the user's language and Bahasa Indonesia, giving the \
                 phrase, a simple pronunciation guide and when to use it."
            }
            AssistantKind::GeneralChat => {
                "Answer general questions about Bali: culture, etiquette, transport, \
                 food and practical travel tips."
            }
        }
    }

    /// Built-in system prompt used when configuration gives no override
    pub fn default_prompt(&self) -> String {
        let others = Self::ALL
            .iter()
            .filter(|other| *other != self)
            .map(|other| format!("'{}'", other.display_name()))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "You are the {name} assistant for a Bali travel concierge.\n\n\
             {focus}\n\n\
             If the user asks about something another tool covers ({others}), answer \
             in one or two sentences and point them to that tool. Politely decline \
             topics unrelated to Bali or travel.\n\n\
             Use the previous messages for context. Format replies in WhatsApp-style \
             Markdown and keep them friendly, like a local guide.",
            name = self.display_name(),
            focus = self.focus(),
        )
    }
}

impl fmt::Display for AssistantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Resolved system prompt per assistant
#[derive(Debug, Clone)]
pub struct AssistantRegistry {
    prompts: HashMap<AssistantKind, String>,
}

impl AssistantRegistry {
    /// Built-in prompts, replaced by any override keyed by slug
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        let mut prompts: HashMap<AssistantKind, String> = AssistantKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.default_prompt()))
            .collect();

        for (slug, prompt) in overrides {
            match AssistantKind::from_slug(slug) {
                Some(kind) if !prompt.trim().is_empty() => {
                    info!("Using configured system prompt for {}", kind);
                    prompts.insert(kind, prompt.clone());
                }
                Some(kind) => warn!("Ignoring empty prompt override for {}", kind),
                None => warn!("Ignoring prompt override for unknown assistant '{}'", slug),
            }
        }

        Self { prompts }
    }

    pub fn system_prompt(&self, kind: AssistantKind) -> &str {
        self.prompts
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Default for AssistantRegistry {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}
