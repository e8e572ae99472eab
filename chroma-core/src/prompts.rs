// Catalogs and message templates for prompt ideas.
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

/// Style anchors injected into the system message, one per request.
pub static AESTHETICS: &[&str] = &[
    "Bioluminescent Mycology: Translucent neon fungi, glowing mycelium networks, damp dark forest floor, macro bokeh, fiber-optic spores, ethereal deep-blue ambiance, cinematic depth of field.",
    "Iridescent Petal-Core: Macro photography of a crystalline flower, liquid mercury dewdrops, prismatic light refraction, soft pastel gradients, hyper-realistic silk textures, f/1.8 aperture.",
    "Frozen Volcanic Earth: Jagged obsidian rock formations meeting glowing molten lava, rising volcanic steam, high-contrast chiaroscuro, cinematic wide-angle, epic scale, 8k resolution.",
    "Celestial Flora: Floating cherry blossoms in zero-gravity, glowing stardust petals, deep space background, ethereal purple nebulae, soft cinematic glow, astronomical photography style.",
    "Ancient Redwood Temple: Massive moss-covered roots, sun-drenched volumetric fog, ancient stone runes, lush ferns, 8k nature photography, vertical composition, sacred atmosphere.",
    "Arctic Aurora Glass: Transparent ice sculptures on a black sand beach, reflecting green aurora borealis, crystalline textures, long exposure, cold ethereal lighting.",
    "Cyber-Organic Synthesis: Humanoid silhouette composed of glowing fiber optics, transparent glass skin, internal hardware glow, dark-synth aesthetic, ray-traced reflections.",
    "Neon-Tokyo Rain: Rain-drenched asphalt, anamorphic pink and teal lens flares, vertical neon signage, moody cyberpunk atmosphere, 35mm film grain, cinematic street photography.",
    "Retro-NASA Solarpunk: White ceramic spacecraft, gold-leaf solar panels, lush interior vertical gardens, bright clean lighting, 1970s futuristic optimism, Kodak Portra aesthetic.",
    "Glitch-Industrial: Corrupted digital architecture, circuit board patterns, distorted VHS scanlines, harsh flickering LED lights, gritty metallic textures, 90s hardware hacking vibe.",
    "Minimalist Data-Flow: Streaming ribbons of golden light particles, obsidian void, mathematical geometry, elegant motion blur, high-end tech aesthetic, abstract vector art.",
    "Satellite Earth-Core: High-altitude satellite view of swirling turquoise ocean currents and coral reefs, hyper-detailed textures, abstract natural patterns, orbital photography.",
    "Brutalist Desert Minimalism: Monolithic raw concrete slabs, sharp geometric shadows, lone palm tree, harsh desert sun, 120mm medium format film, silent liminal atmosphere.",
    "Zen Glass Pavilion: Transparent architecture over a perfectly still mountain lake, heavy reflections, misty morning, soft blue-hour lighting, minimalist perfection, 8k architectural render.",
    "Lush Mediterranean Brutalism: Raw white stone walls, overflowing vibrant bougainvillea, deep turquoise water, harsh noon sunlight, high-contrast shadows, architectural digest style.",
    "Liminal Mall-Wave: Endless white tiled corridors, soft fluorescent glow, nostalgic 90s aesthetic, dreamy liminal space, pastel vaporwave tones, eerie peacefulness.",
    "Gothic Cathedral Noir: Towering stone arches, intricate stained glass, single beam of moonlight, suspended dust motes, dramatic dark-fantasy atmosphere, low-angle perspective.",
    "Scandinavian Hygge-Minimal: Light oak wood textures, soft linen fabrics, warm fireplace glow, snowy window view, soft-focus, cozy minimalist interior photography.",
    "Floating Magritte-Core: Floating green apples and faceless figures in a cloud-filled room, soft day-lit shadows, Belgian surrealism, crisp focus, dream-logic composition.",
    "Liquid Gold Surrealism: A desert where dunes are flowing molten gold, silk-textured sand ripples, chrome-polished sky, high-fashion editorial aesthetic, surreal lighting.",
    "Clockwork Dreamscape: Levitating mechanical gears, brass and ivory textures, sepia-toned clouds, intricate Victorian steampunk, macro details, polished copper reflections.",
    "Underwater Ballroom: Sunken Victorian architecture, schools of glowing fish, swaying silk curtains, shimmering water caustic patterns, ethereal teal atmosphere, submerged dream.",
    "Abstract Clay-Morphism: 3D soft-touch organic shapes, matte pastel textures, satisfying curves, studio lighting, modern UI/UX wallpaper style, high-end 3D render.",
    "Ethereal Origami World: A landscape made entirely of folded iridescent paper, sharp geometric folds, soft backlighting, delicate paper grain, whimsical and intricate.",
    "Impressionist Sunset: Thick oil paint brushstrokes, vibrant orange and violet sky, textured canvas, impasto technique, glowing light, Monet-inspired landscape.",
    "Ukiyo-e Modernism: Traditional Japanese woodblock style combined with modern cityscapes, flat colors, bold outlines, crashing waves, stylized clouds, Hokusai aesthetic.",
    "Renaissance Sci-Fi: Da Vinci style sketches of interstellar engines, aged parchment texture, charcoal and sepia tones, intricate anatomical engineering, vintage manuscript.",
    "Expressionist Chaos: Bold distorted shapes, high-energy brushwork, clashing neon colors, emotional intensity, abstract street-art influence.",
    "Paper-Cut Diorama: Layered depth of field, handcrafted paper silhouettes, back-lit shadows, miniature world aesthetic, vibrant storytelling colors.",
];

/// Compositional directives paired with an aesthetic.
pub static CONSTRAINTS: &[&str] = &[
    "Focus on extreme textures like brushed metal, wet silk, or jagged glass.",
    "Use a 'Double Exposure' photographic technique.",
    "Emphasize a 'Top-Down' or 'Extreme Low-Angle' perspective.",
    "Apply a 'Muted Pastel' or 'Monochromatic High-Contrast' color palette.",
];

pub const USER_PROMPT: &str =
    "Generate a stunning, unique wallpaper concept. Surprise me with the theme.";

/// (open, close) quote pairs a reply may be wrapped in.
const QUOTE_PAIRS: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('`', '`'),
    ('\u{201C}', '\u{201D}'),
    ('\u{2018}', '\u{2019}'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptRecipe {
    pub aesthetic: &'static str,
    pub constraint: &'static str,
}

impl PromptRecipe {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // both catalogs are non-empty statics
        Self {
            aesthetic: AESTHETICS.choose(rng).copied().unwrap_or(AESTHETICS[0]),
            constraint: CONSTRAINTS.choose(rng).copied().unwrap_or(CONSTRAINTS[0]),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are an elite Prompt Engineer for high-end mobile wallpapers.\n\
             Your specific style for this request is: {}\n\
             Instruction: {}\n\
             \n\
             RULES:\n\
             - Generate ONE singular, breathtaking image prompt.\n\
             - Use evocative, sensory language.\n\
             - Return ONLY the prompt text. No quotes. Under 40 words.",
            self.aesthetic, self.constraint
        )
    }
}

/// Trim, drop wrapping quotes and collapse whitespace runs.
/// Returns `None` when nothing is left.
pub fn normalize_prompt_idea(raw: &str) -> Option<String> {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let mut unquoted = raw.trim();
    while let Some(inner) = strip_wrapping_quotes(unquoted) {
        unquoted = inner.trim();
    }
    let collapsed = whitespace.replace_all(unquoted, " ").into_owned();
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Inner text when `text` is wrapped in one matching quote pair. The closing
/// quote must not also appear inside, except as an apostrophe between two
/// letters (`painter's`).
fn strip_wrapping_quotes(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    let last = text.chars().next_back()?;
    if text.chars().count() < 2 || !QUOTE_PAIRS.contains(&(first, last)) {
        return None;
    }
    let inner = &text[first.len_utf8()..text.len() - last.len_utf8()];

    let chars: Vec<char> = inner.chars().collect();
    let closed_early = chars.iter().enumerate().any(|(i, &c)| {
        if c != last {
            return false;
        }
        let apostrophe = matches!(c, '\'' | '\u{2019}')
            && i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|next| next.is_alphanumeric());
        !apostrophe
    });
    if closed_early {
        None
    } else {
        Some(inner)
    }
}
