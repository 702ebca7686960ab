#![warn(missing_docs)]

//! Navigation styles for 3D viewers.
//!
//! A [`NavigationController`](controller::component::NavigationController) turns pointer, wheel,
//! keyboard and touchpad input into camera motion: orbiting with inertial spin, panning, zooming
//! around the cursor, box zoom, seeking to a picked point, and polygon selection. Which chords
//! start which motion is decided by a [`NavigationStyle`](styles::NavigationStyle), so the same
//! viewer can behave like Open Inventor, a CAD package, Blender, or a touchpad app.
//!
//! ## Usage
//!
//! Add [`NavigationPlugin`], then spawn a controller pointing at a camera entity that carries a
//! [`Transform`] and a [`ViewCamera`](controller::camera::ViewCamera):
//!
//! ```
//! # use bevy_app::prelude::*;
//! # use bevy_ecs::prelude::*;
//! # use bevy_transform::prelude::*;
//! # use bevy_math::Vec3;
//! use bevy_navigation_style::prelude::*;
//!
//! fn setup(mut commands: Commands) {
//!     let camera = commands
//!         .spawn((
//!             Transform::from_xyz(0.0, 2.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
//!             ViewCamera::default().with_focal_distance(8.0),
//!         ))
//!         .id();
//!     commands.spawn(NavigationController::new(NavigationStyle::Cad).with_viewer(camera));
//! }
//! ```
//!
//! Outside of Bevy, implement [`Viewer`](controller::viewer::Viewer) and call
//! [`process_event`](controller::component::NavigationController::process_event) yourself.

pub mod controller;
pub mod input;
pub mod selection;
pub mod styles;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::InputSystem;
use bevy_log::prelude::*;
use bevy_math::{bounding::BoundingSphere, Vec2, Vec3};
use bevy_time::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::{CursorMoved, PrimaryWindow, RequestRedraw, Window};

use controller::{
    camera::{CameraMut, ViewCamera},
    component::NavigationController,
    mode::ViewerMode,
    viewer::{SceneBounds, ScenePicker, Viewer},
};
use input::{collect_navigation_input, NavigationInput};
use styles::{NavigationStyle, NavigationStyleChanged};

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            camera::{ViewCamera, ViewProjection},
            component::{NavigationController, NavigationSettings},
            mode::ViewerMode,
            spin::OrbitStyle,
            viewer::{SceneBounds, ScenePicker, StandaloneViewer, Viewer},
        },
        input::{Modifiers, NavEvent, NavEventKind},
        selection::{MouseSelection, SelectionMode},
        styles::{NavigationStyle, NavigationStyleChanged},
        ContextMenuRequested, NavigationModeChanged, NavigationPlugin, SetNavigationStyle,
    };
}

/// Adds navigation to every [`NavigationController`] bound to a camera entity.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavigationInput>()
            .add_event::<CursorMoved>()
            .add_event::<RequestRedraw>()
            .add_event::<ContextMenuRequested>()
            .add_event::<NavigationModeChanged>()
            .add_event::<SetNavigationStyle>()
            .add_event::<NavigationStyleChanged>()
            .add_systems(
                PreUpdate,
                (
                    sync_viewport_size,
                    collect_navigation_input,
                    process_navigation_input,
                )
                    .chain()
                    .after(InputSystem),
            )
            .add_systems(Update, (apply_style_requests, tick_controllers).chain())
            .register_type::<ViewCamera>()
            .register_type::<ViewerMode>()
            .register_type::<NavigationStyle>()
            .register_type::<controller::spin::OrbitStyle>();
    }
}

/// Send to switch the style of a controller.
#[derive(Event, Debug, Clone, Copy)]
pub struct SetNavigationStyle {
    /// The entity holding the [`NavigationController`].
    pub controller: Entity,
    /// The style to switch to.
    pub style: NavigationStyle,
}

/// A right click asked for a context menu. The host decides what to show.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ContextMenuRequested {
    /// The entity holding the [`NavigationController`].
    pub controller: Entity,
    /// Pointer position in logical pixels.
    pub position: Vec2,
}

/// A controller entered a new mode. Hosts use this to pick a cursor icon.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationModeChanged {
    /// The entity holding the [`NavigationController`].
    pub controller: Entity,
    /// The mode now active.
    pub mode: ViewerMode,
}

/// The [`Viewer`] a controller sees inside the ECS world. Notifications are collected and sent as
/// events once the controller is done.
struct EcsViewer<'a> {
    controller: Entity,
    camera: Option<(Mut<'a, Transform>, Mut<'a, ViewCamera>)>,
    picker: Option<&'a ScenePicker>,
    bounds: Option<&'a SceneBounds>,
    redraw: bool,
    menus: Vec<Vec2>,
    mode: Option<ViewerMode>,
}

impl<'a> EcsViewer<'a> {
    fn new(
        controller: Entity,
        camera: Option<(Mut<'a, Transform>, Mut<'a, ViewCamera>)>,
        picker: Option<&'a ScenePicker>,
        bounds: Option<&'a SceneBounds>,
    ) -> Self {
        Self {
            controller,
            camera,
            picker,
            bounds,
            redraw: false,
            menus: Vec::new(),
            mode: None,
        }
    }

    fn flush(
        self,
        redraw: &mut EventWriter<RequestRedraw>,
        menus: &mut EventWriter<ContextMenuRequested>,
        modes: &mut EventWriter<NavigationModeChanged>,
    ) {
        if self.redraw {
            redraw.write(RequestRedraw);
        }
        for position in self.menus {
            menus.write(ContextMenuRequested {
                controller: self.controller,
                position,
            });
        }
        if let Some(mode) = self.mode {
            modes.write(NavigationModeChanged {
                controller: self.controller,
                mode,
            });
        }
    }
}

impl Viewer for EcsViewer<'_> {
    fn camera(&mut self) -> Option<CameraMut<'_>> {
        let (transform, camera) = self.camera.as_mut()?;
        Some(CameraMut::new(&mut **transform, &mut **camera))
    }

    fn has_camera(&mut self) -> bool {
        self.camera.is_some()
    }

    fn pick_point(&mut self, position: Vec2) -> Option<Vec3> {
        let picker = self.picker?;
        let camera = self.camera()?;
        picker.pick_through(&camera, position)
    }

    fn scene_bounds(&mut self) -> Option<BoundingSphere> {
        self.bounds.map(|bounds| bounds.0)
    }

    fn request_redraw(&mut self) {
        self.redraw = true;
    }

    fn open_popup_menu(&mut self, position: Vec2) {
        self.menus.push(position);
    }

    fn set_cursor(&mut self, mode: ViewerMode) {
        self.mode = Some(mode);
    }
}

/// Keep every [`ViewCamera`] sized to the primary window.
pub fn sync_viewport_size(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut ViewCamera>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = window.size();
    if size.min_element() <= 0.0 {
        return;
    }
    for mut camera in &mut cameras {
        if camera.viewport_size != size {
            camera.viewport_size = size;
        }
    }
}

/// Route this frame's [`NavigationInput`] events to every bound controller.
pub fn process_navigation_input(
    mut input: ResMut<NavigationInput>,
    mut controllers: Query<(
        Entity,
        &mut NavigationController,
        Option<&ScenePicker>,
        Option<&SceneBounds>,
    )>,
    mut cameras: Query<(&mut Transform, &mut ViewCamera)>,
    mut redraw: EventWriter<RequestRedraw>,
    mut menus: EventWriter<ContextMenuRequested>,
    mut modes: EventWriter<NavigationModeChanged>,
) {
    if input.events.is_empty() {
        return;
    }
    let events = std::mem::take(&mut input.events);
    for (entity, mut controller, picker, bounds) in &mut controllers {
        let Some(camera) = controller.viewer() else {
            continue;
        };
        let Ok(camera) = cameras.get_mut(camera) else {
            warn!("Navigation controller {entity} is bound to an entity without a camera");
            continue;
        };
        let mut viewer = EcsViewer::new(entity, Some(camera), picker, bounds);
        for event in &events {
            controller.process_event(&mut viewer, event);
        }
        viewer.flush(&mut redraw, &mut menus, &mut modes);
    }
}

/// Advance spins and flights.
pub fn tick_controllers(
    time: Res<Time>,
    mut controllers: Query<(
        Entity,
        &mut NavigationController,
        Option<&ScenePicker>,
        Option<&SceneBounds>,
    )>,
    mut cameras: Query<(&mut Transform, &mut ViewCamera)>,
    mut redraw: EventWriter<RequestRedraw>,
    mut menus: EventWriter<ContextMenuRequested>,
    mut modes: EventWriter<NavigationModeChanged>,
) {
    let now = time.elapsed();
    for (entity, mut controller, picker, bounds) in &mut controllers {
        if !matches!(controller.mode(), ViewerMode::Spinning | ViewerMode::Seek) {
            continue;
        }
        let camera = match controller.viewer() {
            Some(camera) => cameras.get_mut(camera).ok(),
            None => None,
        };
        let mut viewer = EcsViewer::new(entity, camera, picker, bounds);
        controller.tick(&mut viewer, now);
        viewer.flush(&mut redraw, &mut menus, &mut modes);
    }
}

/// Apply [`SetNavigationStyle`] requests.
pub fn apply_style_requests(
    mut requests: EventReader<SetNavigationStyle>,
    mut controllers: Query<&mut NavigationController>,
    mut changed: EventWriter<NavigationStyleChanged>,
    mut modes: EventWriter<NavigationModeChanged>,
) {
    for request in requests.read() {
        let Ok(mut controller) = controllers.get_mut(request.controller) else {
            warn!("No navigation controller on {}", request.controller);
            continue;
        };
        let Some(event) = controller.set_navigation_style(request.style) else {
            continue;
        };
        changed.write(event);
        if let Some(mode) = controller.cursor_update() {
            modes.write(NavigationModeChanged {
                controller: request.controller,
                mode,
            });
        }
    }
}
