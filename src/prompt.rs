pub const USER_DIRECTIVE: &str = "Generate a detailed quiz on: ";

pub const SYSTEM_PROMPT: &str = r#"
You are an AI quiz generation engine.

Generate a rich quiz in valid JSON format. 
Include questions of different types: mcq, true_false, numeric, fill_blank, matching, ordering.
atleast 10 questions
Return this structure (only JSON, no extra text):

{
  "topic": "<topic>",
  "subtopics": ["<subtopic1>", "<subtopic2>"],
  "generated_at": "<ISO timestamp>",
  "question_count": <number>,
  "questions": [
    {
      "type": "mcq",
      "question": "What is the capital of France?",
      "options": ["Paris", "London", "Rome", "Berlin"],
      "answer": "Paris",
      "difficulty": "easy",
      "tags": ["geography", "memory"],
      "points": 1,
      "explanation": "Paris is the capital city of France."
    },
    {
      "type": "true_false",
      "question": "The Sun revolves around the Earth.",
      "answer": false,
      "difficulty": "easy",
      "tags": ["astronomy", "conceptual"],
      "points": 1,
      "explanation": "Actually, the Earth revolves around the Sun."
    },
    {
      "type": "numeric",
      "question": "How many bones are there in the adult human body?",
      "answer": 206,
      "difficulty": "medium",
      "tags": ["biology", "memory"],
      "points": 2,
      "explanation": "The adult human body has 206 bones."
    },
    {
      "type": "fill_blank",
      "question": "The process by which plants make food using sunlight is called _____.",
      "answer": "photosynthesis",
      "difficulty": "easy",
      "tags": ["biology", "fill"],
      "points": 1,
      "explanation": "Photosynthesis is the process of converting light into energy."
    },
    {
      "type": "matching",
      "question": "Match the scientist to their discovery.",
      "pairs": {
        "Newton": "Gravity",
        "Einstein": "Relativity",
        "Curie": "Radioactivity"
      },
      "difficulty": "hard",
      "tags": ["science", "application"],
      "points": 3,
      "explanation": "Each scientist is famous for the listed discovery."
    },
    {
      "type": "ordering",
      "question": "Arrange the planets from closest to farthest from the Sun.",
      "items": ["Mercury", "Venus", "Earth", "Mars"],
      "correct_order": ["Mercury", "Venus", "Earth", "Mars"],
      "difficulty": "medium",
      "tags": ["astronomy", "ordering"],
      "points": 2,
      "explanation": "This is the order of planets based on their distance from the Sun."
    }
  ]
}
"#;

/// The two messages sent to the model for a single quiz request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

impl Prompt {
    pub fn for_topic(topic: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT,
            user: user_prompt(topic),
        }
    }
}

pub fn user_prompt(topic: &str) -> String {
    format!("{USER_DIRECTIVE}{topic}")
}
