/// A canned styling instruction offered next to the free-text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub instruction: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        id: "headshot",
        label: "Corporate headshot",
        instruction: "Corporate headshot: keep the person's face and expression unchanged, \
                      dress them in business attire, use a neutral grey studio backdrop and \
                      soft, even lighting.",
    },
    Preset {
        id: "anime",
        label: "Anime",
        instruction: "Redraw this photo as a hand-drawn anime illustration with clean line \
                      art and vibrant cel shading, keeping the pose and composition.",
    },
    Preset {
        id: "vintage",
        label: "Vintage film",
        instruction: "Make this look like a 1970s film photograph: warm faded colours, \
                      visible grain and slight vignetting.",
    },
    Preset {
        id: "watercolor",
        label: "Watercolor",
        instruction: "Turn this photo into a loose watercolor painting on textured paper.",
    },
    Preset {
        id: "cyberpunk",
        label: "Cyberpunk",
        instruction: "Place the subject in a rainy neon-lit cyberpunk city at night, with \
                      magenta and cyan rim lighting.",
    },
];

pub fn find_preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_ids_are_unique() {
        for (i, preset) in PRESETS.iter().enumerate() {
            assert!(!preset.instruction.trim().is_empty());
            assert!(PRESETS[i + 1..].iter().all(|other| other.id != preset.id));
        }
    }

    #[test]
    fn test_find_preset() {
        assert_eq!(find_preset("headshot").map(|p| p.label), Some("Corporate headshot"));
        assert!(find_preset("missing").is_none());
    }
}
