//! Scenario catalog: canned customer messages per category
//!
//! The conversation-text generator proper is an external collaborator;
//! this catalog is its offline stand-in. Sampling is seeded so runs are
//! reproducible.

use rand::seq::SliceRandom;
use rand::Rng;

use deskline_core::{Category, Language, Message};

/// One scenario: a category, a language, and its message pool.
struct Scenario {
    category: Category,
    language: Language,
    messages: &'static [&'static str],
}

/// A planned conversation, ready for the runner.
#[derive(Debug, Clone)]
pub struct ConversationPlan {
    pub ordinal: u32,
    pub scenario: Category,
    pub language: Language,
    pub messages: Vec<Message>,
}

/// Canned customer queries, per category, plus the multilingual pools.
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
    multilingual: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn builtin() -> Self {
        Self {
            scenarios: vec![
                Scenario {
                    category: Category::RefundStatus,
                    language: Language::English,
                    messages: &[
                        "Check my refund status for booking ID 456",
                        "When will I get my refund?",
                        "I need to know about my refund for booking 789",
                    ],
                },
                Scenario {
                    category: Category::RefundPolicy,
                    language: Language::English,
                    messages: &[
                        "What is your refund policy?",
                        "Can I get a refund for my flight?",
                        "What are the refund terms and conditions?",
                    ],
                },
                Scenario {
                    category: Category::FlightSearch,
                    language: Language::English,
                    messages: &[
                        "Find me a flight from BLR to DEL on September 15",
                        "I need flights from Mumbai to Bangalore tomorrow",
                        "Search for flights to New York next week",
                    ],
                },
                Scenario {
                    category: Category::BaggagePolicy,
                    language: Language::English,
                    messages: &[
                        "What is the baggage allowance for domestic flights?",
                        "How much luggage can I carry?",
                        "What are the baggage rules for international flights?",
                    ],
                },
                Scenario {
                    category: Category::Complaint,
                    language: Language::English,
                    messages: &[
                        "My luggage was damaged during the flight",
                        "I have a complaint about the service",
                        "The staff was very rude to me",
                    ],
                },
                Scenario {
                    category: Category::BookingDetails,
                    language: Language::English,
                    messages: &[
                        "Can you confirm my booking details?",
                        "I need to update my passenger information",
                        "What are the details for booking 12345?",
                    ],
                },
                Scenario {
                    category: Category::Mixed,
                    language: Language::English,
                    messages: &[
                        "I want to book a flight and also check my refund status",
                        "What's the baggage policy and can I get a refund?",
                        "I have a complaint and need to search for flights",
                    ],
                },
            ],
            multilingual: vec![
                Scenario {
                    category: Category::RefundStatus,
                    language: Language::Spanish,
                    messages: &[
                        "Necesito verificar el estado de mi reembolso",
                        "¿Cuál es la política de equipaje?",
                        "Quiero buscar un vuelo de Madrid a Barcelona",
                    ],
                },
                Scenario {
                    category: Category::RefundStatus,
                    language: Language::French,
                    messages: &[
                        "Je voudrais vérifier le statut de mon remboursement",
                        "Quelle est la politique de bagages?",
                        "Je cherche un vol de Paris à Lyon",
                    ],
                },
            ],
        }
    }

    /// Categories with a message pool.
    pub fn categories(&self) -> Vec<Category> {
        self.scenarios.iter().map(|s| s.category).collect()
    }

    /// Sample a 4-6 turn conversation for a category, capped by the
    /// pool size (no message repeats within a conversation).
    pub fn generate(&self, category: Category, rng: &mut impl Rng) -> Vec<Message> {
        let scenario = self
            .scenarios
            .iter()
            .find(|s| s.category == category)
            .unwrap_or(&self.scenarios[0]);
        sample_messages(scenario, rng)
    }

    /// Sample a conversation in a non-default language.
    pub fn generate_multilingual(&self, rng: &mut impl Rng) -> (Language, Category, Vec<Message>) {
        let scenario = self
            .multilingual
            .choose(rng)
            .unwrap_or(&self.multilingual[0]);
        (scenario.language, scenario.category, sample_messages(scenario, rng))
    }

    /// Plan a batch: random scenarios, with every sixth conversation
    /// drawn from the multilingual pools.
    pub fn plan_batch(&self, conversations: u32, rng: &mut impl Rng) -> Vec<ConversationPlan> {
        (1..=conversations)
            .map(|ordinal| {
                if ordinal % 6 == 0 {
                    let (language, scenario, messages) = self.generate_multilingual(rng);
                    ConversationPlan {
                        ordinal,
                        scenario,
                        language,
                        messages,
                    }
                } else {
                    let category = *self
                        .categories()
                        .choose(rng)
                        .unwrap_or(&Category::RefundStatus);
                    ConversationPlan {
                        ordinal,
                        scenario: category,
                        language: Language::English,
                        messages: self.generate(category, rng),
                    }
                }
            })
            .collect()
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn sample_messages(scenario: &Scenario, rng: &mut impl Rng) -> Vec<Message> {
    let turns = rng.gen_range(4..=6).min(scenario.messages.len());
    scenario
        .messages
        .choose_multiple(rng, turns)
        .map(|text| {
            Message::new(*text)
                .with_language(scenario.language)
                .with_category(scenario.category)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_tags_category_and_language() {
        let catalog = ScenarioCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(7);

        let messages = catalog.generate(Category::BaggagePolicy, &mut rng);
        assert!(!messages.is_empty());
        for message in &messages {
            assert_eq!(message.category, Some(Category::BaggagePolicy));
            assert_eq!(message.language, Some(Language::English));
        }
    }

    #[test]
    fn test_no_repeats_within_a_conversation() {
        let catalog = ScenarioCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);

        let messages = catalog.generate(Category::Complaint, &mut rng);
        let mut texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), messages.len());
    }

    #[test]
    fn test_sixth_conversation_is_multilingual() {
        let catalog = ScenarioCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(11);

        let plans = catalog.plan_batch(6, &mut rng);
        assert_eq!(plans.len(), 6);
        assert_ne!(plans[5].language, Language::English);
        for plan in &plans[..5] {
            assert_eq!(plan.language, Language::English);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let catalog = ScenarioCatalog::builtin();
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);

        let a: Vec<String> = catalog
            .plan_batch(4, &mut first)
            .into_iter()
            .flat_map(|p| p.messages.into_iter().map(|m| m.text))
            .collect();
        let b: Vec<String> = catalog
            .plan_batch(4, &mut second)
            .into_iter()
            .flat_map(|p| p.messages.into_iter().map(|m| m.text))
            .collect();

        assert_eq!(a, b);
    }
}
