use crate::foundation::core::{DrawableId, Geometry, Point, Vec2};

/// Pointer gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Panning {
        last_screen: Point,
    },
    Dragging {
        id: DrawableId,
        start_world: Point,
        origin: Geometry,
    },
}

/// What a pointer move should do to the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureUpdate {
    None,
    /// Screen-space pan delta since the previous move.
    Pan(Vec2),
    /// Scene-space displacement since the drag started.
    Drag {
        id: DrawableId,
        origin: Geometry,
        total: Vec2,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureTracker {
    state: Gesture,
}

impl GestureTracker {
    pub fn state(&self) -> Gesture {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == Gesture::Idle
    }

    pub fn begin_pan(&mut self, screen: Point) {
        self.state = Gesture::Panning {
            last_screen: screen,
        };
    }

    pub fn begin_drag(&mut self, id: DrawableId, world: Point, origin: Geometry) {
        self.state = Gesture::Dragging {
            id,
            start_world: world,
            origin,
        };
    }

    pub fn update(&mut self, screen: Point, world: Point) -> GestureUpdate {
        match self.state {
            Gesture::Idle => GestureUpdate::None,
            Gesture::Panning { last_screen } => {
                self.state = Gesture::Panning {
                    last_screen: screen,
                };
                GestureUpdate::Pan(screen - last_screen)
            }
            Gesture::Dragging {
                id,
                start_world,
                origin,
            } => GestureUpdate::Drag {
                id,
                origin,
                total: world - start_world,
            },
        }
    }

    /// Ends the gesture normally, returning the state it was in.
    pub fn finish(&mut self) -> Gesture {
        std::mem::take(&mut self.state)
    }

    /// Aborts the gesture. A drag reports the object and geometry to restore.
    pub fn cancel(&mut self) -> Option<(DrawableId, Geometry)> {
        match std::mem::take(&mut self.state) {
            Gesture::Dragging { id, origin, .. } => Some((id, origin)),
            _ => None,
        }
    }
}
