//! Named animation clips for scene entities.
//!
//! A `ClipLibrary` sits on the root of a spawned scene. Once the scene's
//! `AnimationPlayer` shows up somewhere below it, `link_animation_players`
//! hands that player the library's graph; `play_clips` then applies
//! `PlayClip` requests as blended transitions.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Start `clip` on `target`'s animation player.
#[derive(Event, Clone, Debug)]
pub struct PlayClip {
    pub target: Entity,
    pub clip: String,
    /// Cross-fade time from whatever is playing.
    pub blend: Duration,
    pub looping: bool,
}

/// The clips a scene entity can play, by name.
#[derive(Component, Debug)]
pub struct ClipLibrary {
    pub graph: Handle<AnimationGraph>,
    pub nodes: HashMap<String, AnimationNodeIndex>,
    /// Entity carrying the scene's `AnimationPlayer`, once linked.
    pub animator: Option<Entity>,
    /// Latest request that arrived before the player was linked.
    pub pending: Option<PlayClip>,
    warned: HashSet<String>,
}

impl ClipLibrary {
    /// Register every clip in a fresh graph.
    pub fn new(clips: &[(String, Handle<AnimationClip>)], graphs: &mut Assets<AnimationGraph>) -> Self {
        let mut graph = AnimationGraph::new();
        let root = graph.root;
        let indices: Vec<AnimationNodeIndex> = graph
            .add_clips(clips.iter().map(|(_, h)| h.clone()), 1.0, root)
            .collect();
        let nodes = clips.iter().map(|(name, _)| name.clone()).zip(indices).collect();
        Self {
            graph: graphs.add(graph),
            nodes,
            animator: None,
            pending: None,
            warned: HashSet::new(),
        }
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Node for `name`. Unknown names are logged the first time only.
    pub fn resolve(&mut self, name: &str) -> Option<AnimationNodeIndex> {
        if let Some(node) = self.nodes.get(name) {
            return Some(*node);
        }
        if self.warned.insert(name.to_string()) {
            warn!("animation clip '{name}' not found");
        }
        None
    }
}

/// Give each newly spawned `AnimationPlayer` the graph of the closest
/// `ClipLibrary` above it.
#[allow(clippy::needless_pass_by_value)]
pub fn link_animation_players(
    mut commands: Commands,
    added: Query<Entity, Added<AnimationPlayer>>,
    parents: Query<&Parent>,
    mut libraries: Query<&mut ClipLibrary>,
) {
    for animator in &added {
        let Some(root) = parents.iter_ancestors(animator).find(|e| libraries.contains(*e)) else {
            continue;
        };
        let Ok(mut library) = libraries.get_mut(root) else { continue };
        if library.animator.is_some() {
            continue;
        }
        library.animator = Some(animator);
        commands
            .entity(animator)
            .insert((library.graph.clone(), AnimationTransitions::new()));
        debug!("animation player {animator:?} linked to {root:?}");
    }
}

/// Apply queued and incoming clip requests.
pub fn play_clips(
    mut requests: EventReader<PlayClip>,
    mut libraries: Query<&mut ClipLibrary>,
    mut animators: Query<(&mut AnimationPlayer, &mut AnimationTransitions)>,
) {
    for mut library in &mut libraries {
        if library.animator.is_none() {
            continue;
        }
        if let Some(req) = library.pending.take() {
            start_clip(&mut library, &req, &mut animators);
        }
    }

    for req in requests.read() {
        let Ok(mut library) = libraries.get_mut(req.target) else { continue };
        if library.animator.is_none() {
            library.pending = Some(req.clone());
            continue;
        }
        start_clip(&mut library, req, &mut animators);
    }
}

fn start_clip(
    library: &mut ClipLibrary,
    req: &PlayClip,
    animators: &mut Query<(&mut AnimationPlayer, &mut AnimationTransitions)>,
) {
    let Some(node) = library.resolve(&req.clip) else { return };
    let Some(animator) = library.animator else { return };
    // linked this frame: the graph and transitions are still in the command queue
    let Ok((mut player, mut transitions)) = animators.get_mut(animator) else {
        library.pending = Some(req.clone());
        return;
    };
    let active = transitions.play(&mut player, node, req.blend);
    if req.looping {
        active.repeat();
    }
}
