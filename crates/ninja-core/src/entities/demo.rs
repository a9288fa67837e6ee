use glam::Vec2;

use super::TickContext;
use crate::api::types::{Action, EntityKind};
use crate::components::animation::AnimationLibrary;
use crate::core::physics::PhysicsBody;

/// Actions a demo marker can show, indexed by tile variant.
const DEMONSTRATED: [Action; 6] = [
    Action::Idle,
    Action::Run,
    Action::Jump,
    Action::WallSlide,
    Action::Attack,
    Action::Swim,
];

/// Motionless figure looping one move, placed by the level designer to
/// teach a mechanic.
#[derive(Debug, Clone)]
pub struct Demo {
    pub body: PhysicsBody,
}

impl Demo {
    pub fn new(variant: u32, pos: Vec2, size: Vec2, anims: &AnimationLibrary) -> Self {
        let action = Self::action_for(variant);
        let mut body = PhysicsBody::new(EntityKind::Demo, pos, size, anims).with_gravity_scale(0.0);
        body.set_action(action, anims);
        // the second row of variants is mirrored
        body.flip = (variant as usize / DEMONSTRATED.len()) % 2 == 1;
        Self { body }
    }

    /// Variants past the table wrap around it.
    pub fn action_for(variant: u32) -> Action {
        DEMONSTRATED[variant as usize % DEMONSTRATED.len()]
    }

    pub fn update(&mut self, ctx: &mut TickContext) {
        self.body.update(ctx.tilemap, Vec2::ZERO, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::WorldEvent;
    use crate::components::tilemap::Tilemap;
    use crate::systems::effects::EffectsState;

    #[test]
    fn variant_selects_looping_action() {
        let anims = AnimationLibrary::default();
        let map = Tilemap::new(16);
        let mut effects = EffectsState::new(1);
        let mut events = Vec::<WorldEvent>::new();
        let mut demo = Demo::new(4, Vec2::new(5.0, 5.0), Vec2::new(8.0, 15.0), &anims);
        assert_eq!(demo.body.action, Action::Attack);

        let total = demo.body.animation.def.total_ticks();
        let mut ctx = TickContext::new(&map, &anims, &mut effects, &mut events);
        for _ in 0..total * 3 {
            demo.update(&mut ctx);
        }
        assert!(!demo.body.animation.done);
        assert_eq!(demo.body.pos, Vec2::new(5.0, 5.0));
        assert_eq!(Demo::action_for(7), Action::Run);
    }
}
