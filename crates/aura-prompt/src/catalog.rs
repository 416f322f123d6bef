//! Preset catalog
//!
//! Named styles, scenes and brand colors a user can pick from, plus the
//! per-slot shot variation lists and the angle lists used by derived pipelines.

/// A named, user-selectable prompt fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
}

impl Preset {
    const fn new(id: &'static str, label: &'static str, prompt: &'static str) -> Self {
        Self { id, label, prompt }
    }
}

/// A brand palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSwatch {
    pub name: &'static str,
    pub hex: &'static str,
}

/// Primary accent of the brand palette (Dusty Rose)
pub const CORE_COLOR: &str = "#D99BA3";

pub const COLORS: &[ColorSwatch] = &[
    ColorSwatch { name: "Warm Taupe", hex: "#D0C0B2" },
    ColorSwatch { name: "Alabaster", hex: "#F8F4EC" },
    ColorSwatch { name: "Oatmeal", hex: "#E5D3C5" },
    ColorSwatch { name: "Almond Buff", hex: "#BFA898" },
    ColorSwatch { name: "Dusty Rose", hex: "#D99BA3" },
    ColorSwatch { name: "Flamingo Pink", hex: "#F2B6B6" },
    ColorSwatch { name: "Sage Green", hex: "#6E7A63" },
    ColorSwatch { name: "Espresso", hex: "#46352D" },
    ColorSwatch { name: "Cool Slate", hex: "#929496" },
];

pub const SCENES: &[Preset] = &[
    Preset::new("pinterest_penthouse", "Minimalist Penthouse", "inside a high-end minimalist luxury penthouse with cream furniture, marble details, and natural sunlight"),
    Preset::new("amalfi_beach", "Amalfi Beach Club", "at a luxury private beach club in Amalfi, with white sand, cabanas, and turquoise water background"),
    Preset::new("manhattan_rooftop", "Manhattan Rooftop", "on a chic Manhattan rooftop overlooking Central Park at golden hour with glass railings"),
    Preset::new("parisian_balcony", "Parisian Balcony", "on a classic limestone balcony in Paris with wrought iron railings, overlooking the Eiffel Tower at sunset"),
    Preset::new("pilates_loft", "Aesthetic Pilates Studio", "inside a bright, high-end Reformer Pilates studio with wooden floors, large mirrors, and luxury equipment"),
    Preset::new("botanical_greenhouse", "Glass Greenhouse", "inside a modern architectural glass greenhouse filled with lush green tropical plants and soft diffused sunlight"),
    Preset::new("lake_como_veranda", "Lake Como Estate", "on the stone veranda of a luxury Lake Como villa at dawn, mist over the water, designer outdoor furniture"),
    Preset::new("minimalist_office", "Home Office Sanctuary", "at a sleek minimalist oak desk in a bright home office with a designer lamp and a view of a city skyline"),
    Preset::new("st_moritz_chalet", "Swiss Alps Chalet", "inside a luxury wooden chalet in the Alps with a stone fireplace and snowy mountain views"),
    Preset::new("milanese_cafe", "Milanese Sidewalk Cafe", "sitting at a marble table in a trendy cafe in Milan, with a porcelain coffee cup and a leather handbag"),
    Preset::new("marrakech_riad", "Marrakech Riad", "in a serene riad courtyard with a teal pool, intricate tilework, and climbing bougainvillea"),
    Preset::new("tuscany_vineyard", "Tuscan Vineyard", "overlooking the sun-drenched vineyards of Tuscany at a rustic stone estate at golden hour"),
    Preset::new("scandi_cabin", "Scandi Glass Cabin", "inside a minimalist glass-walled cabin in a pine forest, cozy textures, and soft natural light"),
    Preset::new("london_library", "English Manor Library", "in a quiet mansion library with floor-to-ceiling bookshelves, a rolling ladder, and large leather chairs"),
    Preset::new("malibu_villa", "Malibu Infinity Pool", "at a modern Malibu villa with an infinity pool merging into the Pacific Ocean at sunset"),
    Preset::new("tokyo_loft", "Ginza High-Rise", "inside a sleek, glass-walled high-rise in Ginza with minimalist black and white decor"),
    Preset::new("cote_d_azur", "French Riviera Deck", "on a sun-drenched stone terrace overlooking the Mediterranean with white linen umbrellas"),
    Preset::new("equestrian_ranch", "Boutique Horse Ranch", "standing by a beautiful wooden stable at a boutique luxury horse ranch in the countryside"),
    Preset::new("cotswolds_manor", "Cotswolds Stone Estate", "in the manicured rose garden of a honey-colored stone cottage in the English countryside"),
    Preset::new("wellness_spa", "Minimalist Wellness Spa", "inside a serene luxury spa with dark stone walls, steam, and soft candlelight"),
];

pub const STYLES: &[Preset] = &[
    Preset::new("vanilla_girl", "Vanilla Girl", "Vanilla Girl aesthetic, creamy whites and beige tones, soft textures, knitwear, cozy but expensive vibe, fresh-faced makeup"),
    Preset::new("clean_girl", "Clean Girl", "Clean Girl aesthetic, minimal makeup, slicked back hair, matching cream matching set, glowing dewy skin"),
    Preset::new("old_money", "Old Money / Quiet Luxury", "Old Money aesthetic, quiet luxury, linen vest, silk scarf, pearl earrings, sophisticated and timeless"),
    Preset::new("balletcore", "Balletcore Luxe", "Balletcore aesthetic, silk ribbons, soft pink tulle, leg warmers, delicate hair bows, graceful high-fashion"),
    Preset::new("corporate_chic", "Corporate Siren", "Sophisticated corporate chic, tailored pinstripe blazer, sharp spectacles, silk blouse, powerful model vibe"),
    Preset::new("cottagecore", "Elevated Cottagecore", "High-end cottagecore, vintage-inspired linen dresses, picnic in a manicured meadow, expensive straw accessories"),
    Preset::new("downtown_girl", "Downtown Girl", "City chic, vintage denim, leather trench coat, designer boots, modern urban vibe, cool-girl energy"),
    Preset::new("night_luxe", "Night Luxe", "Night Luxe aesthetic, flash photography, satin slip dress, evening makeup, martini glasses, fine jewelry"),
    Preset::new("soft_minimalist", "Soft Minimalist", "Minimalist high-fashion, clean lines, neutral colors, architectural clothing shapes, understated elegance"),
    Preset::new("coquette", "Coquette Aesthetic", "Coquette vibe, pink lace, heart-shaped accessories, vintage hair clips, playful and ultra-feminine"),
    Preset::new("off_duty", "Off-Duty Model", "Off-Duty Model look, tailored oversized blazer, crisp white t-shirt, denim, structured luxury handbag"),
    Preset::new("dark_academia", "Dark Academia", "Dark Academia, tailored wool blazer, pleated skirt, loafers, sophisticated, intellectual and moody"),
    Preset::new("coastal_grandma", "Coastal Chic", "Coastal aesthetic, white button-down, linen trousers, canvas tote, effortless beach luxury"),
    Preset::new("mob_wife", "Luxe Glamour", "High-glamour aesthetic, tailored faux fur, bold gold jewelry, perfect voluminous blowout hair"),
    Preset::new("gorpcore", "Luxury Gorpcore", "Elevated gorpcore, high-end technical fabrics, designer puffer jacket, outdoor luxury gear, stylishly practical"),
    Preset::new("indie_sleaze", "Indie Sleaze Edit", "Indie Sleaze aesthetic, smudged eyeliner, metallic textures, high-fashion messy cool, vintage filter vibe"),
    Preset::new("y2k_luxe", "Y2K Cyber Glam", "Y2K aesthetic, baby tees, tinted shades, butterfly clips, futuristic metallic fabrics, high-gloss lips"),
    Preset::new("boho_luxe", "Boho Chic", "Boho Luxe aesthetic, crochet textures, layered gold jewelry, flowing silks, desert festival luxury"),
    Preset::new("equestrian", "Equestrian Editorial", "High-fashion equestrian style, tailored riding jacket, boots, leather accents, polished and outdoorsy"),
    Preset::new("royalcore", "Modern Royalcore", "Royalcore aesthetic, corseted gowns, pearl necklaces, white gloves, princess-like grace and elegance"),
];

pub const POSES: &[&str] = &[
    "walking confidently towards the camera",
    "leaning back casually against a surface",
    "sitting with legs crossed or extended on a comfortable surface",
    "twirling or moving dynamically, caught in motion",
    "lounging deeply in a relaxed state",
    "standing with one hip popped, power stance",
    "crouching or squatting fashionably",
    "resting chin on hand, looking relaxed",
    "adjusting hair or sunglasses, candid moment",
    "looking over the shoulder while walking away",
];

pub const CAMERA_ANGLES: &[&str] = &[
    "Low angle (worm's eye view) to make her look powerful and statuesque",
    "High angle / Selfie perspective, intimate and cute",
    "Eye-level straight on, direct connection",
    "Side profile / 3/4 view, not looking at camera",
    "Wide shot capturing the full luxury environment around her",
    "Dutch angle (slight tilt) for a dynamic, editorial vibe",
    "Close-up beauty shot focusing on glowing skin and makeup details",
];

pub const EXPRESSIONS: &[&str] = &[
    "Genuine, candid laughter with head thrown back",
    "Looking away distantly, mysterious and pensive",
    "Playful smirk, looking directly at camera",
    "Soft, gentle smile, looking down or to the side shyly",
    "Intense, confident 'model gaze' (smize)",
    "Eyes closed, soaking up the moment/sun, pure bliss",
    "Caught in motion, mouth slightly open like speaking or laughing",
    "Winking or playful tongue-out expression, showing personality",
];

/// Viewpoints for re-shooting people-centric artifacts
pub const WORKFLOW_ANGLES: &[&str] = &[
    "Extreme Close-Up (Focus on makeup/skin)",
    "Side Profile (Cinematic/Candid)",
    "Low Angle (Power/Fashion Stance)",
    "Wide Angle (Full Environment Context)",
];

/// Viewpoints for re-shooting product artifacts
pub const PRODUCT_ANGLES: &[&str] = &[
    "Top-Down Flat Lay (Editorial Composition)",
    "Macro Detail Shot (Texture/Label Focus)",
    "Eye-Level Hero Shot (Clean Studio)",
    "Lifestyle Context (In Use/On Surface)",
];

/// Canonical angle prepended by the exhaustive reshoot for subject categories
pub const FRONT_FACING_ANGLE: &str = "Front Facing, Direct Eye Contact";

/// Standing instruction sent with every image request
pub const SYSTEM_INSTRUCTION: &str = r#"You are a world-class fashion photographer and creative director specializing in "Pinterest Aesthetic" luxury lifestyle branding.
Your goal is to transform reference images into hyper-realistic, high-fashion lifestyle photos that look like they belong in a viral mood board.

STRICT NON-NEGOTIABLE PRODUCT RULES:
- When products (bottles, jars, kits) are present, you MUST NOT alter any color, shape, branding, packaging, or labelling.
- The product in the output must be a 1:1 identical match to the product in the reference image.
- NO MORPHING, NO HALOING, NO FANTASY ADDITIONS TO PRODUCTS.
- Ensure product labels are crisp, sharp, and perfectly legible as per the original source.
- Products must appear as solid, rigid objects.

MODEL X PRODUCT INTERACTION:
- In the "Model X Product" category, the model MUST be naturally interacting with the products.
- Examples: Holding a bottle elegantly, applying a cream to her face, sitting next to the product kit, or holding the kit with a confident gaze.
- The interaction must feel organic and high-end, not forced.
- Preserve the model's identity and the product's integrity simultaneously.

CRITICAL VISUAL RULES:
- IDENTITY: Always preserve the facial features, skin tone, and core identity of the subject from the reference image.
- CLOTHING & COLOR: Use the brand color palette (#D0C0B2, #F8F4EC, #E5D3C5, #BFA898, #D99BA3, #F2B6B6, #6E7A63, #46352D, #929496). Dusty Rose (#D99BA3) is the primary accent.
- REALISM: All results must be strictly realistic. NO 3D renders, no illustrations. The image must look like it was shot on a Leica or Sony A7R.
- VIBE: Pinterest-ready, expensive, "Soft Life", sophisticated, and extremely aesthetic."#;

/// Look up a style preset by id
#[must_use]
pub fn find_style(id: &str) -> Option<&'static Preset> {
    STYLES.iter().find(|p| p.id == id)
}

/// Look up a scene preset by id
#[must_use]
pub fn find_scene(id: &str) -> Option<&'static Preset> {
    SCENES.iter().find(|p| p.id == id)
}

/// Look up a palette color by hex code (case-insensitive)
#[must_use]
pub fn find_color(hex: &str) -> Option<&'static ColorSwatch> {
    COLORS.iter().find(|c| c.hex.eq_ignore_ascii_case(hex))
}
