//! Template feedback for recognized digits
//!
//! Each digit has a compliment, a suggestion and an encouragement that are
//! joined into one message.

struct FeedbackTemplate {
    compliment: &'static str,
    suggestion: &'static str,
    encouragement: &'static str,
}

const TEMPLATES: [FeedbackTemplate; 10] = [
    FeedbackTemplate {
        compliment: "Beautiful circular shape! Your loops are smooth and controlled.",
        suggestion: "Focus a bit more on closing the circle fully to strengthen the form.",
        encouragement: "You're doing amazing, every circle you draw is a step closer to mastery!",
    },
    FeedbackTemplate {
        compliment: "Strong and confident vertical line!",
        suggestion: "Make sure to keep the stroke steady from top to bottom.",
        encouragement: "You're building fantastic control with every stroke you make!",
    },
    FeedbackTemplate {
        compliment: "Lovely curves shaping nicely!",
        suggestion: "Try connecting the curves a little more fluidly.",
        encouragement: "Progress is in motion, keep those beautiful curves coming!",
    },
    FeedbackTemplate {
        compliment: "Elegant arcs, well done!",
        suggestion: "Balance the top and bottom of the three evenly.",
        encouragement: "Each arc you draw is strengthening your precision!",
    },
    FeedbackTemplate {
        compliment: "Solid angles with great sharpness!",
        suggestion: "Focus on stabilizing the cross-section more firmly.",
        encouragement: "Your hand strength is improving stroke by stroke!",
    },
    FeedbackTemplate {
        compliment: "Nice beginning with confident strokes!",
        suggestion: "Ensure the middle curve flows smoothly into the finish.",
        encouragement: "You are writing your way to stronger motor control!",
    },
    FeedbackTemplate {
        compliment: "Good loop formation!",
        suggestion: "Focus on neatly closing the lower part for more clarity.",
        encouragement: "Every small detail you fix shows massive progress!",
    },
    FeedbackTemplate {
        compliment: "Sharp and quick response!",
        suggestion: "Work on maintaining a consistent slant if possible.",
        encouragement: "Your precision is becoming sharper with every attempt!",
    },
    FeedbackTemplate {
        compliment: "Lovely double loops!",
        suggestion: "Keep the top and bottom loops even for best results.",
        encouragement: "Double loops, double the strength. Keep shining!",
    },
    FeedbackTemplate {
        compliment: "Wonderful circular ending!",
        suggestion: "Try to complete the loop fully to avoid gaps.",
        encouragement: "You're finishing strong, amazing effort!",
    },
];

/// Message used for labels outside 0–9
pub const GENERIC_FEEDBACK: &str =
    "Wonderful effort! Keep practicing your strokes, progress is happening every moment.";

/// Feedback text for a recognized digit
pub fn feedback_for_digit(label: usize) -> String {
    match TEMPLATES.get(label) {
        Some(t) => format!("{} {} {}", t.compliment, t.suggestion, t.encouragement),
        None => GENERIC_FEEDBACK.to_string(),
    }
}
