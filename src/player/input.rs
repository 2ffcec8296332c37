//! Input gathering: keyboard, locked pointer and the virtual touch controls.
//!
//! Everything ends up in the `PlayerIntent` resource, which the movement
//! system drains once per frame.

use bevy::input::mouse::MouseMotion;
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::locomotion::FrameInput;
use crate::settings::{Settings, TouchMode};

/// Joystick deflection is scaled by this before it becomes a look delta.
pub const STICK_SCALE: f32 = 3.0;

/// Intent accumulated since the movement system last ran.
#[derive(Resource, Default, Debug)]
pub struct PlayerIntent(pub FrameInput);

/// Which control scheme drives the player.
#[derive(Resource, Default, Debug)]
pub struct InputDevice {
    pub touch: bool,
}

/// Screen layout of the virtual joystick and buttons, in logical pixels
/// with the origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchLayout {
    pub stick_center: Vec2,
    pub stick_radius: f32,
    pub jump_center: Vec2,
    pub move_center: Vec2,
    pub button_radius: f32,
}

impl TouchLayout {
    /// Stick: 100 px, 35 px from the bottom-left corner.
    /// Jump (A): 80 px, 35 px from the right, 110 px from the bottom.
    /// Move (B): 80 px, 110 px from the right, 35 px from the bottom.
    #[must_use]
    pub fn for_window(size: Vec2) -> Self {
        Self {
            stick_center: Vec2::new(35.0 + 50.0, size.y - 35.0 - 50.0),
            stick_radius: 50.0,
            jump_center: Vec2::new(size.x - 35.0 - 40.0, size.y - 110.0 - 40.0),
            move_center: Vec2::new(size.x - 110.0 - 40.0, size.y - 35.0 - 40.0),
            button_radius: 40.0,
        }
    }

    #[must_use]
    pub fn zone(&self, pos: Vec2) -> Option<TouchZone> {
        if pos.distance(self.stick_center) <= self.stick_radius {
            Some(TouchZone::Stick)
        } else if pos.distance(self.jump_center) <= self.button_radius {
            Some(TouchZone::Jump)
        } else if pos.distance(self.move_center) <= self.button_radius {
            Some(TouchZone::Move)
        } else {
            None
        }
    }

    /// Stick deflection in `-1..=1` per axis, x right and y up.
    #[must_use]
    pub fn stick_axis(&self, pos: Vec2) -> Vec2 {
        let d = (pos - self.stick_center) / self.stick_radius;
        Vec2::new(d.x, -d.y).clamp_length_max(1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchZone {
    Stick,
    Jump,
    Move,
}

/// Collect this frame's keyboard, pointer and touch input into `PlayerIntent`.
#[allow(clippy::needless_pass_by_value)]
pub fn gather_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<Settings>,
    mut device: ResMut<InputDevice>,
    mut intent: ResMut<PlayerIntent>,
) {
    let controls = &settings.controls;
    let touch = match controls.touch {
        TouchMode::On => true,
        TouchMode::Off => false,
        TouchMode::Auto => device.touch || touches.any_just_pressed(),
    };
    if touch != device.touch {
        info!("input: {} controls", if touch { "touch" } else { "keyboard/pointer" });
        device.touch = touch;
    }

    let input = &mut intent.0;
    input.forward |= keys.pressed(controls.key("forward", KeyCode::KeyW));
    input.jump |= keys.pressed(controls.key("jump", KeyCode::Space));

    let Ok(window) = windows.get_single() else {
        motion.clear();
        return;
    };

    // pointer deltas only count while the cursor is locked
    if window.cursor.grab_mode == CursorGrabMode::None {
        motion.clear();
    } else {
        for ev in motion.read() {
            input.move_top -= ev.delta.y;
            input.move_right += ev.delta.x;
        }
    }

    if !touch {
        return;
    }

    let layout = TouchLayout::for_window(Vec2::new(window.width(), window.height()));
    for t in touches.iter() {
        match layout.zone(t.start_position()) {
            Some(TouchZone::Stick) => {
                let axis = layout.stick_axis(t.position()) * STICK_SCALE;
                input.move_right += axis.x;
                input.move_top += axis.y;
            }
            Some(TouchZone::Move) => input.forward = true,
            Some(TouchZone::Jump) | None => {}
        }
    }
    input.jump |= touches
        .iter_just_pressed()
        .any(|t| layout.zone(t.position()) == Some(TouchZone::Jump));
}

/// Lock the cursor on click and release it on the pause key.
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    device: Res<InputDevice>,
) {
    let Ok(mut window) = windows.get_single_mut() else { return };
    if device.touch {
        return;
    }

    if mouse.just_pressed(MouseButton::Left) {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    }
    if keys.just_pressed(settings.controls.key("pause", KeyCode::Escape)) {
        window.cursor.grab_mode = CursorGrabMode::None;
        window.cursor.visible = true;
    }
}

/// Marks the on-screen joystick and buttons.
#[derive(Component)]
pub struct TouchWidget;

/// Spawn the (initially hidden) virtual joystick and A/B buttons.
pub fn spawn_touch_widgets(mut commands: Commands) {
    let circle = |size: f32, place: Style| NodeBundle {
        style: Style {
            position_type: PositionType::Absolute,
            width: Val::Px(size),
            height: Val::Px(size),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..place
        },
        background_color: Color::srgba(1.0, 1.0, 1.0, 0.2).into(),
        border_radius: BorderRadius::MAX,
        visibility: Visibility::Hidden,
        ..default()
    };

    commands.spawn((
        circle(100.0, Style { left: Val::Px(35.0), bottom: Val::Px(35.0), ..default() }),
        TouchWidget,
    ));

    for (letter, right, bottom) in [("A", 35.0, 110.0), ("B", 110.0, 35.0)] {
        commands
            .spawn((
                circle(80.0, Style { right: Val::Px(right), bottom: Val::Px(bottom), ..default() }),
                TouchWidget,
            ))
            .with_children(|b| {
                b.spawn(TextBundle::from_section(
                    letter,
                    TextStyle { font_size: 32.0, color: Color::WHITE, ..default() },
                ));
            });
    }
}

/// Show the touch widgets only while touch controls are active.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_touch_widgets(device: Res<InputDevice>, mut widgets: Query<&mut Visibility, With<TouchWidget>>) {
    if !device.is_changed() {
        return;
    }
    let vis = if device.touch { Visibility::Visible } else { Visibility::Hidden };
    for mut v in &mut widgets {
        *v = vis;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemId;
    use bevy::input::touch::{touch_screen_input_system, TouchInput, TouchPhase};

    fn layout() -> TouchLayout {
        TouchLayout::for_window(Vec2::new(800.0, 600.0))
    }

    fn input_world(mode: TouchMode, grab: CursorGrabMode) -> World {
        let mut settings = Settings::default();
        settings.controls.touch = mode;

        let mut world = World::new();
        world.insert_resource(settings);
        world.init_resource::<ButtonInput<KeyCode>>();
        world.init_resource::<Touches>();
        world.init_resource::<Events<TouchInput>>();
        world.init_resource::<Events<MouseMotion>>();
        world.init_resource::<InputDevice>();
        world.init_resource::<PlayerIntent>();

        let mut window = Window::default();
        window.cursor.grab_mode = grab;
        world.spawn((window, PrimaryWindow));
        world
    }

    fn touch(world: &mut World, id: u64, phase: TouchPhase, position: Vec2) {
        world.send_event(TouchInput { phase, position, window: Entity::PLACEHOLDER, force: None, id });
    }

    /// Run one input frame and drain the resulting intent.
    fn frame(world: &mut World, systems: (SystemId, SystemId)) -> FrameInput {
        world.run_system(systems.0).unwrap();
        world.run_system(systems.1).unwrap();
        world.resource_mut::<PlayerIntent>().0.take()
    }

    fn systems(world: &mut World) -> (SystemId, SystemId) {
        (world.register_system(touch_screen_input_system), world.register_system(gather_input))
    }

    fn window_layout() -> TouchLayout {
        let w = Window::default();
        TouchLayout::for_window(Vec2::new(w.width(), w.height()))
    }

    #[test]
    fn keybinds_set_forward_and_jump() {
        let mut world = input_world(TouchMode::Auto, CursorGrabMode::None);
        let sys = systems(&mut world);
        assert_eq!(frame(&mut world, sys), FrameInput::default());

        let mut keys = world.resource_mut::<ButtonInput<KeyCode>>();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::Space);
        let input = frame(&mut world, sys);
        assert!(input.forward && input.jump);
        assert!(!world.resource::<InputDevice>().touch);
    }

    #[test]
    fn pointer_motion_needs_a_locked_cursor() {
        let motion = || MouseMotion { delta: Vec2::new(10.0, -4.0) };

        let mut free = input_world(TouchMode::Off, CursorGrabMode::None);
        free.send_event(motion());
        let sys = systems(&mut free);
        let input = frame(&mut free, sys);
        assert_eq!((input.move_right, input.move_top), (0.0, 0.0));

        let mut locked = input_world(TouchMode::Off, CursorGrabMode::Locked);
        locked.send_event(motion());
        let sys = systems(&mut locked);
        let input = frame(&mut locked, sys);
        assert_eq!((input.move_right, input.move_top), (10.0, 4.0));
    }

    #[test]
    fn touch_started_on_move_button_holds_forward() {
        let mut world = input_world(TouchMode::On, CursorGrabMode::None);
        let sys = systems(&mut world);
        let l = window_layout();

        touch(&mut world, 2, TouchPhase::Started, l.move_center);
        touch(&mut world, 2, TouchPhase::Moved, Vec2::new(600.0, 300.0));
        assert!(frame(&mut world, sys).forward);
        // finger still down, no new events
        assert!(frame(&mut world, sys).forward);

        touch(&mut world, 2, TouchPhase::Ended, Vec2::new(600.0, 300.0));
        assert!(!frame(&mut world, sys).forward);
    }

    #[test]
    fn jump_button_fires_once_per_press() {
        let mut world = input_world(TouchMode::Auto, CursorGrabMode::None);
        let sys = systems(&mut world);
        let l = window_layout();

        touch(&mut world, 1, TouchPhase::Started, l.jump_center);
        let first = frame(&mut world, sys);
        assert!(first.jump && !first.forward);
        assert!(world.resource::<InputDevice>().touch);

        touch(&mut world, 1, TouchPhase::Moved, l.jump_center + Vec2::new(2.0, 0.0));
        assert!(!frame(&mut world, sys).jump);
    }

    #[test]
    fn zones_match_widget_placement() {
        let l = layout();
        assert_eq!(l.zone(Vec2::new(85.0, 515.0)), Some(TouchZone::Stick));
        assert_eq!(l.zone(Vec2::new(725.0, 450.0)), Some(TouchZone::Jump));
        assert_eq!(l.zone(Vec2::new(650.0, 525.0)), Some(TouchZone::Move));
        assert_eq!(l.zone(Vec2::new(400.0, 300.0)), None);
    }

    #[test]
    fn stick_axis_points_up_and_saturates() {
        let l = layout();
        let up = l.stick_axis(l.stick_center - Vec2::new(0.0, 25.0));
        assert!((up - Vec2::new(0.0, 0.5)).length() < 1e-6);

        let far = l.stick_axis(l.stick_center + Vec2::new(500.0, 0.0));
        assert!((far - Vec2::X).length() < 1e-6);
    }
}
