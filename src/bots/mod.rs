//! Bot simulator: planned answers, bonus picks, and names.
//!
//! Admission scheduling (which stage fires when, cancellation on start)
//! belongs to the phase machine; this module only decides what an admitted
//! bot does.

pub mod names;
pub mod simulator;

pub use names::bot_name;
pub use simulator::{
    draw_accuracy, pick_ability, pick_target, plan_answer, plan_bonus_delay, AnswerPlan,
};
