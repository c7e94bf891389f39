use super::parameter::{ParameterKind, Vitals};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Feed,
    PlayRope,
    PlayTail,
    Sleep,
    NoAction,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Feed => "Feed",
            ActionKind::PlayRope => "Play with rope",
            ActionKind::PlayTail => "Chase tail",
            ActionKind::Sleep => "Sleep",
            ActionKind::NoAction => "",
        }
    }

    /// Image the view shows on the action button.
    pub fn asset(&self) -> &'static str {
        match self {
            ActionKind::Feed => "images/actions/feed.png",
            ActionKind::PlayRope => "images/actions/play_rope.png",
            ActionKind::PlayTail => "images/actions/play_tail.png",
            ActionKind::Sleep => "images/actions/sleep.png",
            ActionKind::NoAction => "images/actions/no_action.png",
        }
    }
}

/// Stage-level declaration of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl ActionTemplate {
    pub fn feed(amount: f64) -> Self {
        Self {
            kind: ActionKind::Feed,
            timer: None,
            amount: Some(amount),
        }
    }

    pub fn ambient(kind: ActionKind, timer: u32) -> Self {
        Self {
            kind,
            timer: Some(timer),
            amount: None,
        }
    }

    pub fn with_timer(mut self, timer: u32) -> Self {
        self.timer = Some(timer);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRole {
    /// Triggered from the action bar.
    Player,
    /// Fired by the creature on its own timer.
    Ambient,
}

/// Placeholder that pads the action bar. Always disabled, never does anything.
pub static NO_ACTION: Action = Action::no_action();

/// A live action owned by one creature.
///
/// Player actions with a timer go on cooldown for `timer` ticks after use.
/// Ambient actions fire every `timer` ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    kind: ActionKind,
    role: ActionRole,
    timer: Option<u32>,
    amount: Option<f64>,
    countdown: u32,
    enabled: bool,
}

impl Action {
    pub fn player(template: &ActionTemplate) -> Self {
        Self {
            kind: template.kind,
            role: ActionRole::Player,
            timer: template.timer,
            amount: template.amount,
            countdown: 0,
            enabled: template.kind != ActionKind::NoAction,
        }
    }

    pub fn ambient(template: &ActionTemplate) -> Self {
        let period = template.timer.unwrap_or(1).max(1);
        Self {
            kind: template.kind,
            role: ActionRole::Ambient,
            timer: Some(period),
            amount: template.amount,
            countdown: period,
            enabled: true,
        }
    }

    pub const fn no_action() -> Self {
        Self {
            kind: ActionKind::NoAction,
            role: ActionRole::Player,
            timer: None,
            amount: None,
            countdown: 0,
            enabled: false,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn role(&self) -> ActionRole {
        self.role
    }

    pub fn timer(&self) -> Option<u32> {
        self.timer
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Ticks left until a player action is usable again or an ambient action fires.
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn asset(&self) -> &'static str {
        self.kind.asset()
    }

    /// Runs the effect and describes what happened.
    pub fn apply(&mut self, vitals: &mut Vitals) -> String {
        let outcome = match self.kind {
            ActionKind::Feed => {
                let amount = self.amount.unwrap_or(0.0);
                match vitals.get_mut(ParameterKind::Satiety) {
                    Some(satiety) => {
                        satiety.add(amount);
                        format!("eats, satiety is now {:.1}", satiety.value())
                    }
                    None => "sniffs at the food".to_string(),
                }
            }
            ActionKind::PlayRope => "plays with a rope!".to_string(),
            ActionKind::PlayTail => "chases its tail".to_string(),
            ActionKind::Sleep => "is sleeping".to_string(),
            ActionKind::NoAction => String::new(),
        };

        if self.role == ActionRole::Player {
            if let Some(timer) = self.timer.filter(|t| *t > 0) {
                self.enabled = false;
                self.countdown = timer;
            }
        }

        outcome
    }

    /// Moves the timer one tick forward. Returns true when an ambient action is due.
    pub fn advance(&mut self) -> bool {
        match self.role {
            ActionRole::Player => {
                if self.countdown > 0 {
                    self.countdown -= 1;
                    if self.countdown == 0 {
                        self.enabled = self.kind != ActionKind::NoAction;
                    }
                }
                false
            }
            ActionRole::Ambient => {
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown == 0 {
                    self.countdown = self.timer.unwrap_or(1).max(1);
                    true
                } else {
                    false
                }
            }
        }
    }
}
