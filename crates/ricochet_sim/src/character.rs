//! Characters and the typed registry that owns them

use crate::rig::BoneProxy;
use crate::scene::CharacterModel;
use ricochet_audio::ClipId;
use std::collections::BTreeMap;

/// Registry key of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub u32);

/// Seconds until a character may speak again
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoiceCooldown {
    remaining: f32,
}

impl VoiceCooldown {
    /// Ready to speak
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds left before the next line
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Whether the character may speak
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Count down, never below zero
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
    }

    /// Start a new wait of `duration` seconds
    pub fn reset(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
    }
}

/// An animated model with its bone proxies and voice lines
pub struct Character {
    id: CharacterId,
    name: String,
    model: Box<dyn CharacterModel>,
    proxies: Vec<BoneProxy>,
    voices: Vec<ClipId>,
    cooldown: VoiceCooldown,
}

impl Character {
    /// Unregistered character wrapping `model`
    pub fn new(name: impl Into<String>, model: Box<dyn CharacterModel>) -> Self {
        Self {
            id: CharacterId(u32::MAX),
            name: name.into(),
            model,
            proxies: Vec::new(),
            voices: Vec::new(),
            cooldown: VoiceCooldown::new(),
        }
    }

    /// Voice lines picked from on proximity
    pub fn with_voices(mut self, voices: Vec<ClipId>) -> Self {
        self.voices = voices;
        self
    }

    /// Bone proxies bound to the model
    pub fn with_proxies(mut self, proxies: Vec<BoneProxy>) -> Self {
        self.proxies = proxies;
        self
    }

    /// Id assigned by the registry
    pub fn id(&self) -> CharacterId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Animated model
    pub fn model(&self) -> &dyn CharacterModel {
        self.model.as_ref()
    }

    /// Animated model, for advancing playback
    pub fn model_mut(&mut self) -> &mut dyn CharacterModel {
        self.model.as_mut()
    }

    /// Bone proxies following the skeleton
    pub fn proxies(&self) -> &[BoneProxy] {
        &self.proxies
    }

    /// Available voice lines
    pub fn voices(&self) -> &[ClipId] {
        &self.voices
    }

    /// Time until the next voice line
    pub fn cooldown(&self) -> &VoiceCooldown {
        &self.cooldown
    }

    /// Time until the next voice line, for resetting
    pub fn cooldown_mut(&mut self) -> &mut VoiceCooldown {
        &mut self.cooldown
    }
}

impl std::fmt::Debug for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("proxies", &self.proxies.len())
            .field("voices", &self.voices)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

/// Characters by id, iterated in id order
#[derive(Debug, Default)]
pub struct CharacterRegistry {
    characters: BTreeMap<CharacterId, Character>,
    next_id: u32,
}

impl CharacterRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a character and assign its id
    pub fn insert(&mut self, mut character: Character) -> CharacterId {
        let id = CharacterId(self.next_id);
        self.next_id += 1;
        character.id = id;
        log::info!(
            "Registered character '{}' as {:?} ({} bone proxies, {} voice lines)",
            character.name,
            id,
            character.proxies.len(),
            character.voices.len()
        );
        self.characters.insert(id, character);
        id
    }

    /// Take a character out of the registry
    pub fn remove(&mut self, id: CharacterId) -> Option<Character> {
        self.characters.remove(&id)
    }

    /// Look up a character
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Look up a character for mutation
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    /// Registered ids in order
    pub fn ids(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.characters.keys().copied()
    }

    /// Characters in id order
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Characters in id order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.values_mut()
    }

    /// Number of registered characters
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Count every voice cooldown down by `dt`
    pub fn tick_cooldowns(&mut self, dt: f32) {
        for character in self.characters.values_mut() {
            character.cooldown.tick(dt);
        }
    }
}
