// src/services/pipeline/bank.rs

//! Static question bank used when generated content is unusable.
//!
//! Answers are stored as option indices, so every entry is valid by
//! construction. Bump `BANK_VERSION` whenever entries change.

use crate::models::{profile::Tier, question::GeneratedQuestion, topic::QuizTopic};

pub const BANK_VERSION: u32 = 1;

#[derive(Debug)]
pub struct BankEntry {
    pub subtopic: &'static str,
    pub question: &'static str,
    pub passage: Option<&'static str>,
    pub options: [&'static str; 4],
    pub answer: usize,
    pub explanation: &'static str,
}

impl BankEntry {
    pub fn to_question(&self, topic: QuizTopic, tier: Tier) -> GeneratedQuestion {
        GeneratedQuestion {
            question: self.question.to_string(),
            passage: self.passage.map(str::to_string),
            options: self.options.iter().map(|o| o.to_string()).collect(),
            correct_answer: self.options[self.answer].to_string(),
            explanation: self.explanation.to_string(),
            topic: topic.name().to_string(),
            subtopic: self.subtopic.to_string(),
            difficulty: tier,
            question_type: if self.passage.is_some() {
                "reading_comprehension".to_string()
            } else {
                "multiple_choice".to_string()
            },
        }
    }
}

#[derive(Debug)]
pub struct BankSection {
    pub topic: QuizTopic,
    pub tier: Tier,
    pub entries: &'static [BankEntry],
}

/// Entries for one (topic, tier). Mixed has no section of its own.
pub fn section(topic: QuizTopic, tier: Tier) -> &'static [BankEntry] {
    BANK.iter()
        .find(|s| s.topic == topic && s.tier == tier)
        .map(|s| s.entries)
        .unwrap_or(&[])
}

const fn entry(
    subtopic: &'static str,
    question: &'static str,
    options: [&'static str; 4],
    answer: usize,
    explanation: &'static str,
) -> BankEntry {
    BankEntry {
        subtopic,
        question,
        passage: None,
        options,
        answer,
        explanation,
    }
}

const fn reading(
    subtopic: &'static str,
    passage: &'static str,
    question: &'static str,
    options: [&'static str; 4],
    answer: usize,
    explanation: &'static str,
) -> BankEntry {
    BankEntry {
        subtopic,
        question,
        passage: Some(passage),
        options,
        answer,
        explanation,
    }
}

const MARKET_PASSAGE: &str = "Every Saturday morning, Lucy walks to the small market near her house. \
She buys fresh bread, apples and cheese for the week. The baker knows her name and always gives her a \
warm smile. Lucy likes the market because it is quiet in the early morning and the food is cheaper than \
in the big supermarket. After shopping, she sits in the park and eats an apple before going home. Her \
brother Tom prefers to sleep late, so he never comes with her.";

const BUS_PASSAGE: &str = "Sam takes the number 12 bus to school every day. The bus usually arrives \
at ten past eight, but last Monday it was twenty minutes late because of heavy rain. Sam was worried \
that he would miss his first lesson, which was a science test. When he finally arrived, his teacher \
told him not to worry, because half of the class had been late too. The test started at nine o'clock \
instead, and Sam felt relieved.";

const REMOTE_WORK_PASSAGE: &str = "Over the last decade, many companies have allowed employees to work \
from home for part of the week. Supporters argue that remote work saves commuting time and lets people \
concentrate without office noise. Critics, however, point out that new employees can struggle to learn \
from colleagues when they rarely meet in person. Some firms have responded with a hybrid model, asking \
staff to come to the office on fixed days for meetings and training, while keeping the remaining days \
flexible. Early surveys suggest that most workers prefer this compromise to either extreme.";

const BEES_PASSAGE: &str = "Honeybees communicate the location of food through a movement known as \
the waggle dance. A forager returning to the hive walks in a straight line while shaking its body, then \
circles back and repeats the pattern. The angle of the straight run relative to vertical indicates the \
direction of the food relative to the sun, while the duration of the waggle signals distance. Other \
bees follow the dancer closely, and within minutes many of them leave the hive to find the same \
flowers. Researchers have decoded these dances to map where colonies forage across a landscape.";

const HISTORIAN_PASSAGE: &str = "Historians have long debated whether the printing press caused the \
intellectual upheavals of early modern Europe or merely accelerated changes already under way. \
Proponents of the first view emphasise how cheaply reproduced texts allowed controversial ideas to \
escape the control of established authorities. Sceptics counter that literacy remained confined to a \
minority for generations, and that oral preaching and manuscript networks did much of the work long \
attributed to print. A growing consensus treats the press as a catalyst whose effects depended heavily \
on local religious and political conditions rather than as an autonomous engine of change.";

const URBAN_PASSAGE: &str = "The conventional narrative holds that cities grew because factories \
needed workers, yet recent scholarship complicates this picture. In several regions, urban populations \
expanded well before industrial employment became widespread, driven instead by commercial networks, \
administrative functions and the migration of rural families displaced by changes in land tenure. \
Factories, in this account, often followed labour rather than creating it. Such findings do not deny \
industrialisation its significance, but they caution against treating a single economic force as the \
sole architect of the modern city.";

pub static BANK: &[BankSection] = &[
    BankSection {
        topic: QuizTopic::Grammar,
        tier: Tier::Beginner,
        entries: &[
            entry(
                "Articles",
                "Which sentence is correct?",
                ["I am student", "I am a student", "I am the student", "I student"],
                1,
                "We use 'a' before singular countable nouns when introducing them.",
            ),
            entry(
                "Verb Tenses",
                "What is the past tense of 'go'?",
                ["goed", "went", "gone", "goes"],
                1,
                "'Went' is the past tense of the irregular verb 'go'.",
            ),
            entry(
                "Prepositions",
                "My birthday is _____ May.",
                ["on", "at", "in", "by"],
                2,
                "We use 'in' with months and years.",
            ),
            entry(
                "Verb Tenses",
                "She _____ to school every day.",
                ["walk", "walks", "walking", "is walk"],
                1,
                "Third person singular in the present simple takes -s.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Grammar,
        tier: Tier::Intermediate,
        entries: &[
            entry(
                "Conditionals",
                "If I _____ you, I would study harder.",
                ["am", "was", "were", "be"],
                2,
                "In second conditional sentences, we use 'were' for all persons after 'if'.",
            ),
            entry(
                "Verb Tenses",
                "I _____ here since 2019.",
                ["live", "am living", "have lived", "lived"],
                2,
                "The present perfect is used with 'since' for actions continuing to now.",
            ),
            entry(
                "Passive Voice",
                "The letters _____ yesterday.",
                ["were sent", "sent", "are sending", "have sent"],
                0,
                "A past passive is formed with 'were' plus the past participle.",
            ),
            entry(
                "Articles",
                "_____ Amazon is the largest river by volume.",
                ["A", "An", "The", "No article"],
                2,
                "Names of rivers take 'the'.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Grammar,
        tier: Tier::Advanced,
        entries: &[
            entry(
                "Conditionals",
                "Had she known about the delay, she _____ earlier.",
                ["would leave", "would have left", "will leave", "had left"],
                1,
                "An inverted third conditional takes 'would have' plus the past participle.",
            ),
            entry(
                "Passive Voice",
                "The bridge is thought _____ in the 12th century.",
                ["to build", "to be building", "to have been built", "being built"],
                2,
                "A perfect passive infinitive refers to a completed past action.",
            ),
            entry(
                "Verb Tenses",
                "By next June, they _____ the project for five years.",
                ["will run", "will have been running", "are running", "have run"],
                1,
                "The future perfect continuous stresses duration up to a future point.",
            ),
            entry(
                "Prepositions",
                "The decision was made _____ the objections of several members.",
                ["despite of", "in spite", "notwithstanding", "although"],
                2,
                "'Notwithstanding' works as a preposition meaning 'in spite of'.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Vocabulary,
        tier: Tier::Beginner,
        entries: &[
            entry(
                "Antonyms",
                "What is the opposite of 'hot'?",
                ["warm", "cold", "wet", "dry"],
                1,
                "'Cold' is the opposite of 'hot'.",
            ),
            entry(
                "Synonyms",
                "Which word means the same as 'big'?",
                ["small", "large", "short", "thin"],
                1,
                "'Large' is a synonym of 'big'.",
            ),
            entry(
                "Phrasal Verbs",
                "Please _____ your coat, it is cold outside.",
                ["put on", "put off", "take off", "turn on"],
                0,
                "'Put on' means to dress in a piece of clothing.",
            ),
            entry(
                "Word Formation",
                "A person who teaches is a _____.",
                ["teachment", "teacher", "teaching", "teachist"],
                1,
                "The suffix -er forms a noun for the person who does the action.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Vocabulary,
        tier: Tier::Intermediate,
        entries: &[
            entry(
                "Idioms",
                "What does 'break the ice' mean?",
                [
                    "to damage something",
                    "to start a conversation",
                    "to feel cold",
                    "to end a friendship",
                ],
                1,
                "'Break the ice' means to relieve tension at the start of a conversation.",
            ),
            entry(
                "Synonyms",
                "Which word is closest in meaning to 'reluctant'?",
                ["eager", "unwilling", "careful", "tired"],
                1,
                "'Reluctant' means unwilling or hesitant.",
            ),
            entry(
                "Phrasal Verbs",
                "The meeting was _____ until next week.",
                ["put off", "put up", "put out", "put in"],
                0,
                "'Put off' means to postpone.",
            ),
            entry(
                "Word Formation",
                "Choose the correct noun: 'Her _____ surprised everyone.'",
                ["decide", "decisive", "decision", "decided"],
                2,
                "'Decision' is the noun form of 'decide'.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Vocabulary,
        tier: Tier::Advanced,
        entries: &[
            entry(
                "Synonyms",
                "The new policy has been _____ by the committee.",
                ["ratified", "justified", "clarified", "nullified"],
                0,
                "'Ratified' means officially approved or confirmed, which fits the context.",
            ),
            entry(
                "Antonyms",
                "Which word is the opposite of 'ephemeral'?",
                ["fleeting", "enduring", "fragile", "obscure"],
                1,
                "'Ephemeral' means short-lived; 'enduring' means lasting.",
            ),
            entry(
                "Idioms",
                "What does 'a Pyrrhic victory' describe?",
                [
                    "a win achieved at too great a cost",
                    "an unexpected triumph",
                    "a victory by deception",
                    "a shared success",
                ],
                0,
                "A Pyrrhic victory inflicts such losses that it is close to defeat.",
            ),
            entry(
                "Word Formation",
                "Her argument was full of _____; it contradicted itself.",
                ["inconsistencies", "consistently", "inconsistent", "consistence"],
                0,
                "A plural noun is needed after 'full of'.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Reading,
        tier: Tier::Beginner,
        entries: &[
            reading(
                "Main Ideas",
                MARKET_PASSAGE,
                "What is the passage mainly about?",
                [
                    "Lucy's Saturday visits to the market",
                    "How to bake bread",
                    "Tom's weekend hobbies",
                    "A big supermarket in town",
                ],
                0,
                "The passage describes Lucy's weekly trip to the market.",
            ),
            reading(
                "Details",
                MARKET_PASSAGE,
                "What does Lucy eat in the park?",
                ["bread", "cheese", "an apple", "a cake"],
                2,
                "The passage says she eats an apple before going home.",
            ),
            reading(
                "Details",
                BUS_PASSAGE,
                "Why was the bus late last Monday?",
                ["It broke down", "Heavy rain", "The driver was ill", "There was a strike"],
                1,
                "The bus was late because of heavy rain.",
            ),
            reading(
                "Inference",
                BUS_PASSAGE,
                "How did Sam feel at the end?",
                ["angry", "bored", "relieved", "sad"],
                2,
                "The test started later, so Sam felt relieved.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Reading,
        tier: Tier::Intermediate,
        entries: &[
            reading(
                "Main Ideas",
                REMOTE_WORK_PASSAGE,
                "What is the main idea of the passage?",
                [
                    "Remote work should be banned",
                    "Hybrid work balances the benefits and drawbacks of remote work",
                    "Offices are too noisy",
                    "Commuting is becoming cheaper",
                ],
                1,
                "The passage weighs both sides and presents the hybrid model as a compromise.",
            ),
            reading(
                "Details",
                REMOTE_WORK_PASSAGE,
                "According to critics, who struggles most with remote work?",
                ["managers", "new employees", "customers", "commuters"],
                1,
                "Critics say new employees struggle to learn from colleagues.",
            ),
            reading(
                "Details",
                BEES_PASSAGE,
                "What does the duration of the waggle signal?",
                [
                    "the direction of food",
                    "the type of flower",
                    "the distance to food",
                    "the number of bees needed",
                ],
                2,
                "The passage says duration signals distance.",
            ),
            reading(
                "Vocabulary in Context",
                BEES_PASSAGE,
                "In the passage, 'forager' most likely means a bee that _____.",
                ["guards the hive", "searches for food", "lays eggs", "builds wax cells"],
                1,
                "The forager returns with information about food.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Reading,
        tier: Tier::Advanced,
        entries: &[
            reading(
                "Main Ideas",
                HISTORIAN_PASSAGE,
                "Which statement best reflects the growing consensus described?",
                [
                    "Print alone transformed European thought",
                    "Print had no real influence",
                    "Print's impact depended on local conditions",
                    "Oral preaching replaced print entirely",
                ],
                2,
                "The consensus treats the press as a catalyst shaped by local conditions.",
            ),
            reading(
                "Inference",
                HISTORIAN_PASSAGE,
                "Why do sceptics mention limited literacy?",
                [
                    "To show that print reached fewer people than often assumed",
                    "To prove manuscripts were cheaper",
                    "To argue that preaching was banned",
                    "To praise early printers",
                ],
                0,
                "Limited literacy suggests print's direct reach was smaller than claimed.",
            ),
            reading(
                "Inference",
                URBAN_PASSAGE,
                "What does the author imply about the conventional narrative?",
                [
                    "It is entirely accurate",
                    "It oversimplifies the causes of urban growth",
                    "It ignores factories",
                    "It was invented recently",
                ],
                1,
                "The passage says recent scholarship complicates the single-cause story.",
            ),
            reading(
                "Vocabulary in Context",
                URBAN_PASSAGE,
                "As used in the passage, 'tenure' refers to _____.",
                [
                    "a period of employment",
                    "the conditions under which land is held",
                    "a type of crop",
                    "a legal dispute",
                ],
                1,
                "'Land tenure' describes how land is owned or held.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Usage,
        tier: Tier::Beginner,
        entries: &[
            entry(
                "Common Expressions",
                "What do you say when you meet someone for the first time?",
                ["Nice to meet you", "See you later", "Good night", "You're welcome"],
                0,
                "'Nice to meet you' is the usual greeting on a first meeting.",
            ),
            entry(
                "Common Expressions",
                "Someone says 'Thank you'. What is a polite reply?",
                ["Excuse me", "You're welcome", "I'm sorry", "Bless you"],
                1,
                "'You're welcome' is the standard reply to thanks.",
            ),
            entry(
                "Collocations",
                "Which is correct: 'to _____ homework'?",
                ["make", "do", "take", "have"],
                1,
                "We say 'do homework'.",
            ),
            entry(
                "Formal vs Informal",
                "Which greeting is the most formal?",
                ["Hey!", "Hi there", "Good morning", "What's up?"],
                2,
                "'Good morning' is suitable in formal situations.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Usage,
        tier: Tier::Intermediate,
        entries: &[
            entry(
                "Collocations",
                "Which collocation is correct?",
                ["make a decision", "do a decision", "take a decide", "have a decide"],
                0,
                "'Make a decision' is the natural collocation.",
            ),
            entry(
                "Formal vs Informal",
                "Which phrase best opens a formal email?",
                ["Hey guys,", "Dear Ms Patel,", "Yo,", "What's up,"],
                1,
                "'Dear' plus title and surname is the formal opening.",
            ),
            entry(
                "Common Expressions",
                "A friend says 'I'm all ears.' What do they mean?",
                [
                    "They have an ear infection",
                    "They are ready to listen",
                    "They cannot hear you",
                    "They are tired",
                ],
                1,
                "'I'm all ears' means fully ready to listen.",
            ),
            entry(
                "Collocations",
                "She _____ a mistake in the report.",
                ["did", "made", "took", "got"],
                1,
                "We say 'make a mistake'.",
            ),
        ],
    },
    BankSection {
        topic: QuizTopic::Usage,
        tier: Tier::Advanced,
        entries: &[
            entry(
                "Formal vs Informal",
                "Which sentence is most appropriate in a formal report?",
                [
                    "The results were kind of bad.",
                    "The results were pretty awful.",
                    "The results were considerably below expectations.",
                    "The results totally flopped.",
                ],
                2,
                "Formal writing avoids colloquial intensifiers.",
            ),
            entry(
                "Collocations",
                "Which adjective collocates with 'criticism'?",
                ["heavy", "scathing", "strong-minded", "tall"],
                1,
                "'Scathing criticism' is a fixed collocation.",
            ),
            entry(
                "Common Expressions",
                "'To play devil's advocate' means to _____.",
                [
                    "argue a position you may not hold to test an idea",
                    "behave badly on purpose",
                    "defend someone in court",
                    "make a risky bet",
                ],
                0,
                "Playing devil's advocate means arguing the other side for the sake of debate.",
            ),
            entry(
                "Collocations",
                "The committee reached a _____ agreement after hours of talks.",
                ["tentative", "tentacle", "tempting", "tenacious"],
                0,
                "'Tentative agreement' means a provisional one.",
            ),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_PASSAGE_CHARS;

    #[test]
    fn test_every_sub_domain_and_tier_has_entries() {
        for topic in QuizTopic::SUB_DOMAINS {
            for tier in Tier::ALL {
                assert!(!section(topic, tier).is_empty(), "{topic} {tier}");
            }
        }
        assert!(section(QuizTopic::Mixed, Tier::Beginner).is_empty());
    }

    #[test]
    fn test_entries_are_valid_by_construction() {
        for s in BANK {
            for e in s.entries {
                assert!(e.answer < 4, "{}", e.question);
                assert!(e.options.iter().all(|o| !o.trim().is_empty()), "{}", e.question);
                for (i, o) in e.options.iter().enumerate() {
                    assert!(!e.options[i + 1..].contains(o), "duplicate option in {}", e.question);
                }
                assert!(
                    s.topic.subtopics().contains(&e.subtopic),
                    "unknown subtopic {}",
                    e.subtopic
                );
                assert!(e.to_question(s.topic, s.tier).has_valid_answer());
            }
        }
    }

    #[test]
    fn test_reading_entries_carry_passages() {
        for tier in Tier::ALL {
            for e in section(QuizTopic::Reading, tier) {
                let passage = e.passage.unwrap_or_default();
                assert!(passage.chars().count() >= MIN_PASSAGE_CHARS);
            }
        }
    }

    #[test]
    fn test_to_question_copies_answer_text() {
        let q = section(QuizTopic::Grammar, Tier::Beginner)[0]
            .to_question(QuizTopic::Grammar, Tier::Beginner);
        assert_eq!(q.correct_answer, "I am a student");
        assert_eq!(q.topic, "Grammar");
        assert_eq!(q.question_type, "multiple_choice");
    }
}
