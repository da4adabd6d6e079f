//! Shared fixture for unit tests: a small house with a mailbox, a window, a
//! lamp, and a dark cellar.

use std::collections::HashMap;

use crate::condition::Condition;
use crate::description::DescriptionTable;
use crate::flags::FlagKey;
use crate::graph::{Achievement, Rank, ScoringRules, WorldGraph};
use crate::interaction::{InteractionSpec, Verb};
use crate::object::{ContainerSpec, LightSourceSpec, ObjectDefinition};
use crate::scene::{Exit, SceneDefinition};
use crate::state::{Location, WorldState};

fn scene_at(id: &str) -> Location {
    Location::Scene(id.to_string())
}

fn object(id: &str, name: &str, start: Location) -> ObjectDefinition {
    ObjectDefinition::new(id, name, start)
}

fn portable(id: &str, name: &str, start: Location, weight: u32) -> ObjectDefinition {
    let mut def = object(id, name, start);
    def.takeable = true;
    def.weight = weight;
    def
}

fn container(id: &str, name: &str, start: Location, capacity: u32, open: bool, locked: bool) -> ObjectDefinition {
    let mut def = object(id, name, start);
    def.container = Some(ContainerSpec {
        capacity,
        starts_open: open,
        starts_locked: locked,
    });
    def
}

fn with(def: &mut ObjectDefinition, verb: Verb, spec: InteractionSpec) {
    def.interactions.insert(verb, spec);
}

pub(crate) fn create_test_graph() -> WorldGraph {
    let window_open = FlagKey::ObjectOpen("window".into());
    let trapdoor_open = FlagKey::ObjectOpen("trapdoor".into());
    let rug_moved = FlagKey::Custom("rugMoved".into());

    let mut west = SceneDefinition::new(
        "west_of_house",
        "West of House",
        "You are standing in an open field west of a white house.",
    );
    west.description.visited = Some("The white house looms to the east.".into());
    west.objects = vec!["mailbox".into(), "window".into()];
    let mut in_window = Exit::new("east", "kitchen");
    in_window.precondition = Condition::flag(window_open.clone());
    in_window.barred_message = Some("The window is closed.".into());
    in_window.score = 10;
    west.exits = vec![in_window];

    let mut kitchen = SceneDefinition::new("kitchen", "Kitchen", "You are in the kitchen of the white house.");
    kitchen.objects = vec!["sack".into(), "key".into(), "bottle".into(), "chest".into()];
    kitchen.exits = vec![Exit::new("west", "living_room"), Exit::new("east", "west_of_house")];

    let mut living = SceneDefinition::new("living_room", "Living Room", "You are in the living room.");
    living.description.overrides = vec![(
        Condition::flag(rug_moved.clone()),
        "You are in the living room. The rug lies pushed aside.".into(),
    )];
    living.objects = vec!["lamp".into(), "rug".into(), "trapdoor".into()];
    let mut down = Exit::new("down", "cellar");
    down.precondition = Condition::flag(trapdoor_open.clone());
    down.score = 25;
    let mut back = Exit::new("east", "kitchen");
    back.hidden = true;
    living.exits = vec![down, back];

    let mut cellar = SceneDefinition::new("cellar", "Cellar", "You are in a dark and damp cellar.");
    cellar.natural_light = false;
    cellar.description.dark = Some("It is pitch black. You are likely to be eaten by a grue.".into());
    cellar.objects = vec!["painting".into()];
    cellar.exits = vec![Exit::new("up", "living_room")];

    let mut mailbox = container("mailbox", "small mailbox", scene_at("west_of_house"), 5, false, false);
    mailbox.aliases = vec!["box".into()];
    with(
        &mut mailbox,
        Verb::Open,
        InteractionSpec {
            message: Some(DescriptionTable::plain("Opening the small mailbox reveals a leaflet.")),
            score: 2,
            ..InteractionSpec::default()
        },
    );

    let mut leaflet = portable("leaflet", "leaflet", Location::Container("mailbox".into()), 1);
    leaflet.requires_light = true;
    with(
        &mut leaflet,
        Verb::Other("read".into()),
        InteractionSpec {
            message: Some(DescriptionTable::plain("WELCOME TO LANTERN!")),
            score: 5,
            ..InteractionSpec::default()
        },
    );

    let mut window = object("window", "window", scene_at("west_of_house"));
    with(
        &mut window,
        Verb::Open,
        InteractionSpec {
            message: Some(DescriptionTable::plain(
                "With great effort, you open the window far enough to allow entry.",
            )),
            failure_message: Some("The window is already open.".into()),
            precondition: Condition::not(Condition::flag(window_open.clone())),
            grants: vec![window_open.clone()],
            ..InteractionSpec::default()
        },
    );

    let sack = {
        let mut def = container("sack", "burlap sack", scene_at("kitchen"), 2, true, false);
        def.takeable = true;
        def
    };
    let key = portable("key", "iron key", scene_at("kitchen"), 1);
    let bottle = portable("bottle", "glass bottle", scene_at("kitchen"), 2);
    let mut chest = container("chest", "wooden chest", scene_at("kitchen"), 10, false, true);
    with(
        &mut chest,
        Verb::Unlock,
        InteractionSpec {
            failure_message: Some("You need a key for that.".into()),
            requires_held: vec!["key".into()],
            ..InteractionSpec::default()
        },
    );

    let mut lamp = portable("lamp", "brass lantern", scene_at("living_room"), 1);
    lamp.aliases = vec!["lamp".into(), "lantern".into()];
    lamp.requires_light = false;
    lamp.light_source = Some(LightSourceSpec {
        battery_life: Some(3),
        starts_on: false,
    });

    let mut rug = object("rug", "oriental rug", scene_at("living_room"));
    with(
        &mut rug,
        Verb::Other("move".into()),
        InteractionSpec {
            message: Some(DescriptionTable::plain(
                "With a great effort, the rug is moved to one side of the room, revealing a trap door.",
            )),
            failure_message: Some("Having moved the rug previously, you find it impossible to move it again.".into()),
            precondition: Condition::not(Condition::flag(rug_moved.clone())),
            grants: vec![rug_moved],
            reveals: vec!["trapdoor".into()],
            ..InteractionSpec::default()
        },
    );

    let mut trapdoor = object("trapdoor", "trap door", scene_at("living_room"));
    trapdoor.visible_on_entry = false;
    with(
        &mut trapdoor,
        Verb::Open,
        InteractionSpec {
            message: Some(DescriptionTable::plain("The door reluctantly opens to reveal a rickety staircase.")),
            precondition: Condition::not(Condition::flag(trapdoor_open.clone())),
            failure_message: Some("The trap door is already open.".into()),
            grants: vec![trapdoor_open],
            ..InteractionSpec::default()
        },
    );

    let mut painting = portable("painting", "painting", scene_at("cellar"), 2);
    with(
        &mut painting,
        Verb::Take,
        InteractionSpec {
            score: 4,
            ..InteractionSpec::default()
        },
    );

    let objects: HashMap<String, ObjectDefinition> = [
        mailbox, leaflet, window, sack, key, bottle, chest, lamp, rug, trapdoor, painting,
    ]
    .into_iter()
    .map(|def| (def.id.clone(), def))
    .collect();

    let mut graph = WorldGraph {
        title: "Test House".into(),
        slug: "test-house".into(),
        start_scene: "west_of_house".into(),
        scenes: [west, kitchen, living, cellar]
            .into_iter()
            .map(|scene| (scene.id.clone(), scene))
            .collect(),
        objects: objects.into_iter().collect(),
        scoring: ScoringRules {
            report_title: "Scorecard".into(),
            ranks: vec![
                Rank {
                    threshold: 100.0,
                    name: "Master".into(),
                    description: "Everything.".into(),
                },
                Rank {
                    threshold: 50.0,
                    name: "Adventurer".into(),
                    description: "Half.".into(),
                },
                Rank {
                    threshold: 0.0,
                    name: "Beginner".into(),
                    description: "Nothing much.".into(),
                },
            ],
            achievements: vec![Achievement {
                id: "first_points".into(),
                threshold: 5,
                message: "You are on your way.".into(),
            }],
        },
        ..WorldGraph::default()
    };
    graph.max_score = graph.compute_max_score();
    graph
}

pub(crate) fn create_test_state(graph: &WorldGraph) -> WorldState {
    WorldState::new(graph).expect("fixture state is consistent")
}
