//! Canned responses for the rule-based assistant.

/// One pattern group and its candidate responses.
pub struct RuleEntry {
    pub patterns: &'static [&'static str],
    pub responses: &'static [&'static str],
}

/// Matching is lowercase-substring over `patterns`; the first hit wins.
pub const RULES: &[RuleEntry] = &[
    RuleEntry {
        patterns: &["hello", "hi", "hey", "greetings"],
        responses: &[
            "Hello there! How can I assist you today?",
            "Hi! Nice to meet you.",
            "Hey, what's up?",
            "Greetings! Ready to chat.",
        ],
    },
    RuleEntry {
        patterns: &["how are you", "how are you doing"],
        responses: &[
            "I'm a digital assistant, so I don't have feelings, but I'm functioning perfectly!",
            "I'm doing great, thanks for asking! How about you?",
            "As an AI, I'm always ready to help!",
        ],
    },
    RuleEntry {
        patterns: &["what can you do", "help me", "your purpose"],
        responses: &[
            "I can answer basic questions, provide information, and engage in simple conversations. What would you like to know?",
            "I'm here to assist you with various tasks. Just ask!",
            "My purpose is to help you. Ask me anything!",
        ],
    },
    RuleEntry {
        patterns: &[
            "write a short story about a cat",
            "tell me a story",
            "story of cat",
        ],
        responses: &[
            "Once upon a time, in a cozy little house, lived a fluffy cat named Luna. Luna loved naps and sunbeams, but her true passion was chasing the elusive red dot. One day, the red dot led her to a mysterious, sparkling portal...",
            "A tale of whiskers and wonder! There was a brave feline named Mittens who embarked on a grand adventure to find the legendary catnip mountain. Along the way, she befriended a wise old owl and outsmarted a grumpy badger.",
            "In a quiet alley, a tiny stray kitten named Shadow found a warm, discarded box. It wasn't much, but it was home. One evening, a kind stranger offered Shadow a bowl of milk, and her life changed forever.",
        ],
    },
    RuleEntry {
        patterns: &["write a poem", "poem about nature", "create a poem"],
        responses: &[
            "Whispers of wind through emerald leaves,\nSunlight dappling, a world that breathes.\nRivers murmur, a gentle flow,\nNature's beauty, everywhere you go.",
            "In fields of green, where wildflowers bloom,\nButterflies dance, dispelling gloom.\nMountains stand tall, beneath skies so blue,\nNature's artistry, forever true.",
        ],
    },
    RuleEntry {
        patterns: &["what is react", "explain react"],
        responses: &[
            "React is a JavaScript library for building user interfaces, primarily single-page applications. It allows developers to create reusable UI components.",
            "React is a declarative, efficient, and flexible JavaScript library for building user interfaces. It lets you compose complex UIs from small and isolated pieces of code called 'components'.",
        ],
    },
    RuleEntry {
        patterns: &["what is vite", "explain vite"],
        responses: &[
            "Vite is a next-generation frontend tooling that provides an extremely fast development experience. It's known for its rapid hot module replacement (HMR) and optimized build process.",
            "Vite is a build tool that aims to provide a faster and leaner development experience for modern web projects. It uses native ES modules for development and Rollup for production builds.",
        ],
    },
    RuleEntry {
        patterns: &["thank you", "thanks"],
        responses: &["You're welcome!", "Glad I could help!", "Anytime!"],
    },
    RuleEntry {
        patterns: &["bye", "goodbye", "see you"],
        responses: &[
            "Goodbye! Have a great day!",
            "See you later!",
            "Farewell! Come back anytime.",
        ],
    },
];

/// Continuations served when a story-mode user asks for the next part.
pub const STORY_CONTINUATIONS: &[&str] = &[
    "The portal shimmered, drawing Luna into a world where fish flew and mice wore tiny hats! She knew this was the adventure she'd always dreamed of.",
    "Mittens, with the owl's guidance, scaled the treacherous cliffs of Catnip Mountain, the scent of pure bliss growing stronger with every paw-step.",
    "The kind stranger, a retired librarian, took Shadow home. There, Shadow discovered a warm bed, endless cuddles, and a lifetime supply of delicious tuna.",
];

/// Prompts nudging a story-mode user toward "continue".
pub const STORY_PROMPTS: &[&str] = &[
    "We're currently in story mode. Would you like me to continue the story about the cat?",
    "To get the next part of the story, just say 'continue' or 'next part'.",
];

/// Served when no pattern matches.
pub const FALLBACK: &str =
    "I'm sorry, I don't quite understand that. Could you please rephrase or ask something else?";
