use serde::{Deserialize, Serialize};

/// Stable identifier used across WorldDef references.
pub type Id = String;

/// Authored condition: an ordered list of clauses that must all hold.
///
/// Each clause is a flag name, `!flag`, or a `|`-joined group of either form
/// (e.g. `"lampOn|!cellar_visited"`).
pub type ConditionDef = Vec<String>;

/// Top-level authored world data loaded by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldDef {
    pub game: GameDef,
    #[serde(default)]
    pub scenes: Vec<SceneDef>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}

/// Game-level metadata and startup configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameDef {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub intro: String,
    pub start_scene: Id,
    /// Maximum total weight the player may carry, if any.
    #[serde(default)]
    pub carry_limit: Option<u32>,
    /// Flags set when a new game begins.
    #[serde(default)]
    pub initial_flags: Vec<String>,
    #[serde(default)]
    pub scoring: ScoringDef,
}

/// Scoring ranks and achievement thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringDef {
    #[serde(default = "default_report_title")]
    pub report_title: String,
    #[serde(default = "default_scoring_ranks")]
    pub ranks: Vec<ScoringRankDef>,
    #[serde(default)]
    pub achievements: Vec<AchievementDef>,
}

impl Default for ScoringDef {
    fn default() -> Self {
        Self {
            report_title: default_report_title(),
            ranks: default_scoring_ranks(),
            achievements: Vec::new(),
        }
    }
}

/// Single scoring rank entry, keyed by percentage of the maximum score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRankDef {
    pub threshold: f32,
    pub name: String,
    pub description: String,
}

/// A trophy granted the first time the running score reaches `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: Id,
    pub threshold: u32,
    pub message: String,
}

fn default_report_title() -> String {
    "Scorecard".to_string()
}

fn default_scoring_ranks() -> Vec<ScoringRankDef> {
    vec![
        ScoringRankDef {
            threshold: 100.0,
            name: "Master Adventurer".to_string(),
            description: "Every treasure found, every door opened. The house holds no more secrets.".to_string(),
        },
        ScoringRankDef {
            threshold: 75.0,
            name: "Adventurer".to_string(),
            description: "A thorough expedition with only a few corners left unlit.".to_string(),
        },
        ScoringRankDef {
            threshold: 50.0,
            name: "Junior Adventurer".to_string(),
            description: "You found the cellar and lived to tell about it.".to_string(),
        },
        ScoringRankDef {
            threshold: 25.0,
            name: "Novice Adventurer".to_string(),
            description: "You read the leaflet. That is more than most people do.".to_string(),
        },
        ScoringRankDef {
            threshold: 0.0,
            name: "Beginner".to_string(),
            description: "You stood near a white house and wondered.".to_string(),
        },
    ]
}

/// Description text plus its ordered conditional overrides.
///
/// Overrides are checked in declaration order; the first one whose condition
/// holds wins.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DescriptionDef {
    pub text: String,
    #[serde(default)]
    pub overrides: Vec<OverrideDef>,
    /// Text used instead of everything else when the player has no light.
    #[serde(default)]
    pub dark: Option<String>,
    /// Text used on return visits when no override applies.
    #[serde(default)]
    pub visited: Option<String>,
}

impl DescriptionDef {
    /// Plain description with no overrides.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// A single `(condition -> text)` entry in a description table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideDef {
    pub when: ConditionDef,
    pub text: String,
}

/// Scene (location) definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub region: String,
    /// Scene is lit without any carried light source.
    #[serde(default)]
    pub lit: bool,
    pub desc: DescriptionDef,
    #[serde(default)]
    pub exits: Vec<ExitDef>,
}

/// Exit metadata for scene navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitDef {
    pub direction: String,
    pub to: Id,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub requires: ConditionDef,
    #[serde(default)]
    pub barred_message: Option<String>,
    /// Points awarded the first time the player arrives through any exit into `to`.
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub hidden: bool,
}

/// Authoring-time reference to an object's starting location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationRef {
    Inventory,
    Nowhere,
    Scene(Id),
    Container(Id),
}

/// Object definition used by the engine at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub desc: DescriptionDef,
    pub location: LocationRef,
    #[serde(default = "default_true")]
    pub visible_on_entry: bool,
    #[serde(default = "default_true")]
    pub requires_light: bool,
    #[serde(default)]
    pub takeable: bool,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub container: Option<ContainerDef>,
    #[serde(default)]
    pub light_source: Option<LightSourceDef>,
    #[serde(default)]
    pub interactions: Vec<InteractionDef>,
}

fn default_true() -> bool {
    true
}

fn default_weight() -> u32 {
    1
}

/// Container attributes for objects that can hold other objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerDef {
    /// Total weight the container can hold.
    pub capacity: u32,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub locked: bool,
}

/// Light source attributes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LightSourceDef {
    /// Turns of use before the source dies; engine default when absent.
    #[serde(default)]
    pub battery_life: Option<u32>,
    #[serde(default)]
    pub on: bool,
}

/// A verb-triggered, precondition-gated bundle of effects on an object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InteractionDef {
    pub verb: String,
    #[serde(default)]
    pub message: Option<DescriptionDef>,
    #[serde(default)]
    pub failure_message: Option<String>,
    #[serde(default)]
    pub requires: ConditionDef,
    /// Objects that must be in the player's inventory (tools).
    #[serde(default)]
    pub requires_held: Vec<Id>,
    #[serde(default)]
    pub grants: Vec<String>,
    #[serde(default)]
    pub removes: Vec<String>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub reveals: Vec<Id>,
    #[serde(default)]
    pub transfers: Vec<TransferDef>,
    #[serde(default)]
    pub target_scene: Option<Id>,
}

/// Move an object to a new location as an interaction effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferDef {
    pub object: Id,
    pub to: LocationRef,
}
