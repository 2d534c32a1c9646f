//! Character proximity and voice cooldown

mod common;

use common::{DriftingBones, RecordingOutput};
use glam::Vec3;
use ricochet_audio::{Channel, ClipId, NullOutput};
use ricochet_physics::{PhysicsConfig, PhysicsWorld};
use ricochet_sim::prelude::*;
use ricochet_sim::rig;

fn character(world: &mut PhysicsWorld, name: &str, at: Vec3, voices: Vec<ClipId>) -> Character {
    let model = DriftingBones::at(&[at, at + Vec3::Y]);
    let proxies = rig::bind(world, &model, 0.05).unwrap();
    Character::new(name, Box::new(model))
        .with_proxies(proxies)
        .with_voices(voices)
}

fn bounce_at(position: Vec3) -> BounceEvent {
    BounceEvent {
        projectile: ProjectileId(0),
        position,
        velocity: Vec3::new(0.0, 5.0, 0.0),
    }
}

fn dispatcher() -> AudioDispatcher {
    AudioDispatcher::new(
        BounceAudioConfig::default(),
        VoiceConfig {
            hit_radius: 0.5,
            cooldown: 2.0,
        },
        99,
    )
}

#[test]
fn test_cooldown_gates_voice_lines() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut characters = CharacterRegistry::new();
    let guard = character(&mut world, "guard", Vec3::ZERO, vec![ClipId(10), ClipId(11)]);
    let id = characters.insert(guard);

    let mut dispatch = dispatcher();
    let mut out = RecordingOutput::default();
    let hit = bounce_at(Vec3::new(0.2, 0.0, 0.0));

    assert_eq!(dispatch.on_character_proximity(&hit, &mut characters, &world, &mut out), vec![id]);
    assert_eq!(characters.get(id).unwrap().cooldown().remaining(), 2.0);

    // Still cooling down
    for _ in 0..19 {
        characters.tick_cooldowns(0.1);
        assert!(dispatch
            .on_character_proximity(&hit, &mut characters, &world, &mut out)
            .is_empty());
    }
    assert_eq!(out.on_channel(Channel::Voice).len(), 1);

    characters.tick_cooldowns(0.15);
    assert!(characters.get(id).unwrap().cooldown().is_ready());
    assert_eq!(dispatch.on_character_proximity(&hit, &mut characters, &world, &mut out), vec![id]);
    assert_eq!(out.on_channel(Channel::Voice).len(), 2);
    assert_eq!(characters.get(id).unwrap().cooldown().remaining(), 2.0);

    let voices = [ClipId(10), ClipId(11)];
    assert!(out.on_channel(Channel::Voice).iter().all(|c| voices.contains(c)));
}

#[test]
fn test_two_in_range_speak_third_does_not() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut characters = CharacterRegistry::new();
    let a = characters.insert(character(&mut world, "a", Vec3::new(0.3, 0.0, 0.0), vec![ClipId(1)]));
    let b = characters.insert(character(&mut world, "b", Vec3::new(-0.3, 0.0, 0.0), vec![ClipId(2)]));
    let c = characters.insert(character(&mut world, "c", Vec3::new(5.0, 0.0, 0.0), vec![ClipId(3)]));

    let mut out = RecordingOutput::default();
    let event = bounce_at(Vec3::ZERO);
    let spoke = dispatcher().on_character_proximity(&event, &mut characters, &world, &mut out);

    assert_eq!(spoke, vec![a, b]);
    assert_eq!(out.on_channel(Channel::Voice), vec![ClipId(1), ClipId(2)]);
    assert!(characters.get(c).unwrap().cooldown().is_ready());
}

#[test]
fn test_one_line_per_character_even_with_many_bones_in_range() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut characters = CharacterRegistry::new();
    let model = DriftingBones::at(&[Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), Vec3::new(0.0, 0.1, 0.0)]);
    let proxies = rig::bind(&mut world, &model, 0.05).unwrap();
    characters.insert(
        Character::new("crowd", Box::new(model))
            .with_proxies(proxies)
            .with_voices(vec![ClipId(4)]),
    );

    let mut out = RecordingOutput::default();
    dispatcher().on_character_proximity(&bounce_at(Vec3::ZERO), &mut characters, &world, &mut out);
    assert_eq!(out.played.len(), 1);
}

#[test]
fn test_character_without_voices_is_silent() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut characters = CharacterRegistry::new();
    let id = characters.insert(character(&mut world, "mute", Vec3::ZERO, Vec::new()));

    let mut out = RecordingOutput::default();
    let event = bounce_at(Vec3::ZERO);
    let spoke = dispatcher().on_character_proximity(&event, &mut characters, &world, &mut out);

    assert!(spoke.is_empty());
    assert!(out.played.is_empty());
    assert!(characters.get(id).unwrap().cooldown().is_ready());
}

#[test]
fn test_voice_selection_is_seeded() {
    let run = |seed: u64| {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let mut characters = CharacterRegistry::new();
        let voices: Vec<ClipId> = (0..8).map(ClipId).collect();
        characters.insert(character(&mut world, "talker", Vec3::ZERO, voices));

        let mut dispatch = AudioDispatcher::new(
            BounceAudioConfig::default(),
            VoiceConfig {
                hit_radius: 0.5,
                cooldown: 0.0,
            },
            seed,
        );
        let mut out = RecordingOutput::default();
        for _ in 0..10 {
            dispatch.on_character_proximity(&bounce_at(Vec3::ZERO), &mut characters, &world, &mut out);
        }
        out.on_channel(Channel::Voice)
    };

    assert_eq!(run(5), run(5));
    assert_eq!(run(5).len(), 10);
}

#[test]
fn test_unplayed_voice_line_keeps_character_ready() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut characters = CharacterRegistry::new();
    let id = characters.insert(character(&mut world, "guard", Vec3::ZERO, vec![ClipId(10)]));

    let mut dispatch = dispatcher();
    let mut silent = NullOutput::new();
    let hit = bounce_at(Vec3::ZERO);

    let spoke = dispatch.on_character_proximity(&hit, &mut characters, &world, &mut silent);
    assert!(spoke.is_empty());
    assert_eq!(silent.requests(), 1);
    assert!(characters.get(id).unwrap().cooldown().is_ready());

    // A working output gets the line straight away
    let mut out = RecordingOutput::default();
    assert_eq!(dispatch.on_character_proximity(&hit, &mut characters, &world, &mut out), vec![id]);
    assert_eq!(out.on_channel(Channel::Voice), vec![ClipId(10)]);
}
