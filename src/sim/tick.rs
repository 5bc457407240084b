//! Per-frame run update
//!
//! One call advances the session by one frame. The phase decides which
//! systems run; everything downstream of a death is skipped that frame.

use glam::Vec2;

use super::clock::clamp_dt;
use super::collision::resolve;
use super::obstacles::StompOutcome;
use super::state::{DeathRecord, RunEvent, RunPhase, RunSession};
use crate::tuning::Placement;

/// Input for a single frame, already mapped from devices
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump / start / restart pressed this frame
    pub action_press: bool,
    /// Jump key released this frame
    pub action_release: bool,
    pub pause_toggle: bool,
    /// Horizontal intent in [-1, 1]
    pub horizontal: f32,
    /// Demo mode - the autopilot plays
    pub autopilot: bool,
}

/// Advance the session by `dt` seconds
pub fn tick(session: &mut RunSession, input: &TickInput, dt: f32) {
    let dt = clamp_dt(dt);
    session.events.clear();

    let mut input = input.clone();
    if input.autopilot {
        autopilot(session, &mut input);
    }

    if input.pause_toggle {
        match session.phase {
            RunPhase::Running => {
                session.phase = RunPhase::Paused;
                session.clock.rebaseline();
                session.events.push(RunEvent::Paused);
                log::info!("Paused");
                return;
            }
            RunPhase::Paused => {
                session.phase = RunPhase::Running;
                session.clock.rebaseline();
                session.events.push(RunEvent::Resumed);
                log::info!("Resumed");
                return;
            }
            _ => {}
        }
    }

    match session.phase {
        RunPhase::Ready => tick_ready(session, &input, dt),
        RunPhase::Countdown => tick_countdown(session, dt),
        RunPhase::Running => tick_running(session, &input, dt),
        RunPhase::Paused => {}
        RunPhase::Dying => tick_dying(session, dt),
        RunPhase::GameOver => tick_game_over(session, &input, dt),
    }
}

fn tick_ready(s: &mut RunSession, input: &TickInput, dt: f32) {
    let w = &s.tuning.world;
    s.backdrop.scroll(w.ready_scroll_speed, dt, w.ground_segment);
    s.player.integrate(dt, &s.tuning, false);

    if input.action_press {
        s.phase = RunPhase::Countdown;
        s.countdown.value = s.tuning.timing.countdown_from;
        s.countdown.timer = 0.0;
        s.events.push(RunEvent::CountdownStep {
            value: s.countdown.value,
        });
    }
}

fn tick_countdown(s: &mut RunSession, dt: f32) {
    let w = &s.tuning.world;
    s.backdrop.scroll(w.ready_scroll_speed, dt, w.ground_segment);
    s.player.integrate(dt, &s.tuning, false);

    let step = s.tuning.timing.countdown_step;
    s.countdown.timer += dt;
    while s.countdown.timer >= step {
        s.countdown.timer -= step;
        if s.countdown.value == 0 {
            s.phase = RunPhase::Running;
            s.events.push(RunEvent::Started);
            log::info!("Run started");
            break;
        }
        s.countdown.value -= 1;
        s.events.push(RunEvent::CountdownStep {
            value: s.countdown.value,
        });
    }
}

fn tick_running(s: &mut RunSession, input: &TickInput, dt: f32) {
    // Input
    s.player.set_horizontal_intent(input.horizontal, &s.tuning);
    if input.action_press {
        if let Some(kind) = s.player.jump_press(&s.tuning) {
            s.events.push(RunEvent::Jumped(kind));
        }
    }
    if input.action_release {
        s.player.jump_release(&s.tuning);
    }

    // World
    s.ramp.tick(dt);
    let speed = s.ramp.speed;
    s.run_elapsed += dt;
    s.backdrop.scroll(speed, dt, s.tuning.world.ground_segment);

    s.obstacles.try_spawn(dt, s.run_elapsed, speed, &s.tuning, &mut s.rng);
    s.obstacles.advance(dt, speed);

    let anchor = s.obstacles.incoming(s.tuning.world.width);
    let ratio = s.ramp.speed_ratio();
    s.genes.try_spawn(dt, ratio, anchor, &s.tuning, &mut s.rng);
    s.genes.advance(dt, speed, &s.tuning);

    // Player
    let was_grounded = s.player.grounded;
    s.player.integrate(dt, &s.tuning, true);
    if s.player.grounded && !was_grounded {
        s.events.push(RunEvent::Landed);
    }

    // Collisions
    let res = resolve(&s.player, &s.obstacles.obstacles, &s.genes.genes, &s.tuning);
    if let Some(index) = res.lethal {
        die(s, index);
        return;
    }
    if let Some(index) = res.stomp {
        stomp(s, index);
    }
    if res.near_miss {
        if s.effects.near_miss_timer <= 0.0 {
            s.events.push(RunEvent::NearMiss);
        }
        s.effects.flag_near_miss(&s.tuning.effects);
    }
    for gene in s.genes.collect(&res.collected) {
        let points = s.score.record_gene(&gene, s.tuning.effects.gene_flash_duration);
        let center = gene.bounds().center();
        s.effects.popup(format!("+{points}"), center, gene.color);
        s.events.push(RunEvent::GeneCollected {
            name: gene.info.name.clone(),
            points,
        });
    }

    // Score and feedback
    s.score.add_distance(speed, dt);
    s.effects.age(dt, &s.tuning.effects);
    s.score.tick_flash(dt);
}

fn stomp(s: &mut RunSession, index: usize) {
    let Some(obstacle) = s.obstacles.obstacles.get(index) else {
        return;
    };
    let name = obstacle.name.clone();
    let bounds = obstacle.bounds();
    let hitbox_top = obstacle.hitbox().top();
    let top_center = Vec2::new(bounds.center().x, bounds.top());
    let radius = bounds.size().x * 0.5;

    let destroyed = matches!(s.obstacles.stomp(index), Some(StompOutcome::Destroyed(_)));
    s.player.stomp_bounce(hitbox_top, &s.tuning);
    s.effects.ring(top_center, radius);
    s.events.push(RunEvent::Stomped {
        obstacle: name,
        destroyed,
    });
}

fn die(s: &mut RunSession, index: usize) {
    let record = s.obstacles.obstacles.get(index).map(|o| DeathRecord {
        kind: o.kind,
        name: o.name.clone(),
        display_name: o.display_name.clone(),
        pos: o.pos,
    });
    let name = record.as_ref().map(|r| r.name.clone()).unwrap_or_default();
    log::info!(
        "Player hit {name} after {:.1}s at {}m",
        s.run_elapsed,
        s.score.meters()
    );
    s.death = record;
    s.death_timer = 0.0;
    s.phase = RunPhase::Dying;
    s.events.push(RunEvent::Died { obstacle: name });
}

fn tick_dying(s: &mut RunSession, dt: f32) {
    s.death_timer += dt;
    s.effects.age(dt, &s.tuning.effects);
    s.score.tick_flash(dt);
    if s.death_timer >= s.tuning.timing.death_duration {
        enter_game_over(s);
    }
}

fn enter_game_over(s: &mut RunSession) {
    let total = s.score.total();
    s.new_record = s.high_scores.save_high_score_if_greater(total);
    s.score.high_score = s.high_scores.best();
    s.game_over_timer = 0.0;
    s.phase = RunPhase::GameOver;
    s.events.push(RunEvent::GameOver {
        score: total,
        new_record: s.new_record,
    });
    log::info!("Game over: score {total} (high score {})", s.score.high_score);
}

fn tick_game_over(s: &mut RunSession, input: &TickInput, dt: f32) {
    s.game_over_timer += dt;
    s.effects.age(dt, &s.tuning.effects);
    s.score.tick_flash(dt);
    if input.action_press && s.can_restart() {
        s.reset();
    }
}

/// Demo mode: start runs, jump ground obstacles, restart after game over
fn autopilot(s: &RunSession, input: &mut TickInput) {
    match s.phase {
        RunPhase::Ready => input.action_press = true,
        RunPhase::GameOver => input.action_press = s.can_restart(),
        RunPhase::Running => {
            let reach = s.ramp.speed * s.tuning.effects.autopilot_lookahead;
            let front = s.player.pos.x + s.player.size.x;
            let threat = s.obstacles.obstacles.iter().any(|o| {
                let gap = o.pos.x - front;
                o.placement == Placement::Ground && gap >= 0.0 && gap <= reach
            });
            input.action_press = threat && s.player.grounded;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::obstacles::Obstacle;
    use crate::sim::genes::Gene;
    use crate::tuning::Tuning;

    fn press() -> TickInput {
        TickInput {
            action_press: true,
            ..Default::default()
        }
    }

    fn pause() -> TickInput {
        TickInput {
            pause_toggle: true,
            ..Default::default()
        }
    }

    fn running_session(seed: u64) -> RunSession {
        let mut s = RunSession::with_seed(seed);
        s.phase = RunPhase::Running;
        s
    }

    /// Put a stone right on top of the player
    fn place_stone_on_player(s: &mut RunSession) {
        let kind = s.tuning.obstacles.kinds[0].clone();
        let stone = Obstacle::new(0, &kind, s.player.pos.x + 10.0, &s.tuning);
        s.obstacles.obstacles.push(stone);
    }

    #[test]
    fn test_ready_to_countdown_on_action() {
        let mut s = RunSession::with_seed(1);
        tick(&mut s, &TickInput::default(), 0.1);
        assert_eq!(s.phase, RunPhase::Ready);
        assert!(s.backdrop.ground_offset > 0.0);
        tick(&mut s, &press(), 0.1);
        assert_eq!(s.phase, RunPhase::Countdown);
        assert_eq!(s.countdown.value, 3);
        assert_eq!(s.events(), &[RunEvent::CountdownStep { value: 3 }]);
    }

    #[test]
    fn test_countdown_carries_over_remainder() {
        let mut s = RunSession::with_seed(2);
        tick(&mut s, &press(), 0.0);
        // 3/32 s frames; the four 0.8 s steps end at 3.2 s, inside frame 35
        let dt = 0.09375;
        let mut values = Vec::new();
        for frame in 1..=35 {
            tick(&mut s, &pause(), dt);
            for e in s.events() {
                if let RunEvent::CountdownStep { value } = e {
                    values.push((frame, *value));
                }
            }
            if frame < 35 {
                assert_eq!(s.phase, RunPhase::Countdown, "frame {frame}");
            }
        }
        assert_eq!(values, vec![(9, 2), (18, 1), (26, 0)]);
        assert_eq!(s.phase, RunPhase::Running);
        assert_eq!(s.events(), &[RunEvent::Started]);
    }

    #[test]
    fn test_lethal_hit_then_game_over_timing() {
        let mut s = running_session(3);
        place_stone_on_player(&mut s);
        tick(&mut s, &TickInput::default(), 0.0);
        assert_eq!(s.phase, RunPhase::Dying);
        assert_eq!(s.death.as_ref().map(|d| d.name.as_str()), Some("kidney-stone"));

        // Ten 0.05 s frames make up the 0.5 s death animation
        let frozen_x = s.obstacles.obstacles[0].pos.x;
        tick(&mut s, &press(), 0.05);
        assert_eq!(s.phase, RunPhase::Dying);
        for _ in 0..8 {
            tick(&mut s, &pause(), 0.05);
            assert_eq!(s.phase, RunPhase::Dying);
        }
        assert_eq!(s.obstacles.obstacles[0].pos.x, frozen_x);

        tick(&mut s, &TickInput::default(), 0.05);
        assert_eq!(s.phase, RunPhase::GameOver);
    }

    #[test]
    fn test_death_short_circuits_scoring() {
        let mut s = running_session(4);
        place_stone_on_player(&mut s);
        tick(&mut s, &TickInput::default(), 0.05);
        assert_eq!(s.phase, RunPhase::Dying);
        assert_eq!(s.score.distance, 0.0);
    }

    #[test]
    fn test_game_over_saves_high_score_and_honours_cooldown() {
        let store = Box::new(MemoryStore::with_score(10));
        let mut s = RunSession::new(Tuning::default(), 5, store);
        s.phase = RunPhase::Running;
        s.score.distance = 5000.0;
        place_stone_on_player(&mut s);
        tick(&mut s, &TickInput::default(), 0.0);
        for _ in 0..10 {
            tick(&mut s, &TickInput::default(), 0.1);
            if s.phase == RunPhase::GameOver {
                break;
            }
        }
        assert_eq!(s.phase, RunPhase::GameOver);
        assert!(s.new_record);
        assert_eq!(s.high_score(), 50);
        assert!(s.events().contains(&RunEvent::GameOver {
            score: 50,
            new_record: true
        }));

        for _ in 0..10 {
            tick(&mut s, &press(), 0.1);
            assert_eq!(s.phase, RunPhase::GameOver);
        }
        for _ in 0..6 {
            tick(&mut s, &TickInput::default(), 0.1);
        }
        tick(&mut s, &press(), 0.1);
        assert_eq!(s.phase, RunPhase::Ready);
        assert_eq!(s.high_score(), 50);
        assert_eq!(s.score.high_score, 50);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut s = running_session(6);
        for _ in 0..50 {
            tick(&mut s, &TickInput::default(), 0.05);
        }
        s.score.gene_score = 30;
        s.effects.popup("+10", Vec2::ZERO, 0);
        s.obstacles.obstacles.clear();
        place_stone_on_player(&mut s);
        tick(&mut s, &TickInput::default(), 0.0);
        for _ in 0..30 {
            tick(&mut s, &TickInput::default(), 0.1);
        }
        tick(&mut s, &press(), 0.1);

        assert_eq!(s.phase, RunPhase::Ready);
        assert_eq!(s.score.distance, 0.0);
        assert_eq!(s.score.gene_score, 0);
        assert!(s.score.history.is_empty());
        assert!(s.obstacles.obstacles.is_empty());
        assert!(s.genes.genes.is_empty());
        assert!(s.effects.popups.is_empty());
        assert_eq!(s.ramp.speed, s.tuning.world.base_speed);
        assert_eq!(s.run_elapsed, 0.0);
        assert!(s.death.is_none());
        assert!(s.player.grounded);
        assert!(s.events().contains(&RunEvent::Reset));
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut s = running_session(7);
        let idle = TickInput::default();
        for i in 0..=60 {
            s.frame(f64::from(i) / 60.0, &idle);
        }
        s.frame(1.1, &pause());
        assert_eq!(s.phase, RunPhase::Paused);
        let before = serde_json::to_string(&s.snapshot()).unwrap();
        for i in 0..100 {
            s.frame(2.0 + f64::from(i), &idle);
        }
        assert_eq!(serde_json::to_string(&s.snapshot()).unwrap(), before);

        let distance = s.score.distance;
        s.frame(500.0, &pause());
        assert_eq!(s.phase, RunPhase::Running);
        // First frame after resuming measures from a fresh baseline
        s.frame(500.016, &idle);
        assert_eq!(s.score.distance, distance);
        s.frame(500.032, &idle);
        assert!(s.score.distance > distance);
    }

    #[test]
    fn test_countdown_and_dying_ignore_pause() {
        let mut s = RunSession::with_seed(8);
        tick(&mut s, &press(), 0.0);
        tick(&mut s, &pause(), 0.01);
        assert_eq!(s.phase, RunPhase::Countdown);

        let mut s = running_session(8);
        place_stone_on_player(&mut s);
        tick(&mut s, &TickInput::default(), 0.0);
        assert_eq!(s.phase, RunPhase::Dying);
        tick(&mut s, &pause(), 0.05);
        assert_eq!(s.phase, RunPhase::Dying);
        assert!(s.events().is_empty());
        assert!((s.death_timer - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_pause_mid_fall_keeps_vertical_state() {
        let mut s = running_session(13);
        let idle = TickInput::default();
        s.player.pos.y -= 150.0;
        s.player.grounded = false;
        s.player.vel.y = 120.0;
        s.frame(0.0, &idle);
        s.frame(1.0 / 60.0, &idle);
        assert!(!s.player.grounded);
        assert!(s.player.vel.y > 0.0);

        let (y, vy) = (s.player.pos.y, s.player.vel.y);
        s.frame(2.0 / 60.0, &pause());
        for i in 1..=300 {
            s.frame(2.0 / 60.0 + f64::from(i) / 60.0, &idle);
        }
        assert_eq!((s.player.pos.y, s.player.vel.y), (y, vy));

        s.frame(6.0, &pause());
        assert_eq!(s.phase, RunPhase::Running);
        assert_eq!((s.player.pos.y, s.player.vel.y), (y, vy));
        // First frame after resuming integrates no time
        s.frame(6.5, &idle);
        assert_eq!((s.player.pos.y, s.player.vel.y), (y, vy));
        s.frame(6.5 + 1.0 / 60.0, &idle);
        assert!(s.player.pos.y > y);
        assert!(s.player.vel.y > vy);
    }

    #[test]
    fn test_deep_stomp_on_surviving_obstacle_does_not_kill() {
        let mut s = running_session(14);
        let kind = s.tuning.obstacles.kinds[1].clone();
        let mut toxin = Obstacle::new(1, &kind, s.player.pos.x, &s.tuning);
        toxin.pos.y = 300.0;
        let toxin_top = toxin.hitbox().top();
        s.obstacles.obstacles.push(toxin);

        // One 1/60 s frame from vy=600 falls 10.8 px; end 12 px deep
        let inset_p = s.player.size.y * s.tuning.player.hitbox_shrink;
        s.player.grounded = false;
        s.player.vel.y = 600.0;
        s.player.pos.y = toxin_top + 1.2 - (s.player.size.y - inset_p);

        tick(&mut s, &TickInput::default(), 1.0 / 60.0);
        assert!(s.events().contains(&RunEvent::Stomped {
            obstacle: "toxin".into(),
            destroyed: false
        }));
        for frame in 0..20 {
            tick(&mut s, &TickInput::default(), 1.0 / 60.0);
            assert_eq!(s.phase, RunPhase::Running, "frame {frame}");
        }
        assert!(s.obstacles.obstacles[0].damaged);
    }

    #[test]
    fn test_stomp_bounces_and_damages() {
        let mut s = running_session(9);
        let kind = s.tuning.obstacles.kinds[1].clone();
        let mut toxin = Obstacle::new(1, &kind, s.player.pos.x, &s.tuning);
        // Falling, hitbox bottom a few px into the toxin's hitbox
        let inset_o = kind.height * kind.hitbox_shrink;
        let inset_p = s.player.size.y * s.tuning.player.hitbox_shrink;
        toxin.pos.y = 300.0;
        s.player.grounded = false;
        s.player.vel.y = 60.0;
        s.player.pos.y = 300.0 + inset_o + 4.0 - (s.player.size.y - inset_p) - 1.0;
        s.obstacles.obstacles.push(toxin);

        tick(&mut s, &TickInput::default(), 1.0 / 60.0);
        assert_eq!(s.phase, RunPhase::Running);
        assert_eq!(s.player.vel.y, s.tuning.obstacles.stomp_bounce_velocity);
        assert!(s.obstacles.obstacles[0].damaged);
        assert_eq!(s.effects.rings.len(), 1);
        assert!(s.events().contains(&RunEvent::Stomped {
            obstacle: "toxin".into(),
            destroyed: false
        }));
    }

    #[test]
    fn test_gene_pickup_scores_and_pops() {
        let mut s = running_session(10);
        let info = s.tuning.genes.kinds[2].clone();
        let pos = s.player.bounds().center();
        s.genes.genes.push(Gene::new(2, info, pos));

        tick(&mut s, &TickInput::default(), 1.0 / 60.0);
        assert_eq!(s.score.gene_score, 20);
        assert_eq!(s.score.history.len(), 1);
        assert_eq!(s.effects.popups.len(), 1);
        assert_eq!(s.effects.popups[0].text, "+20");
        assert_eq!(s.score.flash.as_ref().map(|f| f.name.as_str()), Some("NPHS1"));
        assert!(s.genes.genes.is_empty());
    }

    #[test]
    fn test_jump_in_running_emits_event() {
        let mut s = running_session(11);
        tick(&mut s, &press(), 1.0 / 60.0);
        assert!(!s.player.grounded);
        assert!(s.events().iter().any(|e| matches!(e, RunEvent::Jumped(_))));
    }

    #[test]
    fn test_autopilot_starts_run() {
        let mut s = RunSession::with_seed(12);
        let demo = TickInput {
            autopilot: true,
            ..Default::default()
        };
        tick(&mut s, &demo, 0.016);
        assert_eq!(s.phase, RunPhase::Countdown);
    }

    #[test]
    fn test_determinism() {
        let demo = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut a = RunSession::with_seed(99999);
        let mut b = RunSession::with_seed(99999);
        for _ in 0..3600 {
            tick(&mut a, &demo, 1.0 / 60.0);
            tick(&mut b, &demo, 1.0 / 60.0);
        }
        assert_eq!(a.seed(), 99999);
        let a = serde_json::to_string(&a.snapshot()).unwrap();
        let b = serde_json::to_string(&b.snapshot()).unwrap();
        assert_eq!(a, b);
    }
}
