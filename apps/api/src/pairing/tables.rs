//! Static wine knowledge: grape varieties, style keywords and the
//! wine-type × main-ingredient pairing table. Values are hand-tuned and kept
//! as literals.

use serde::{Deserialize, Serialize};

use crate::models::wine::WineType;
use crate::profile::schema::AromaFamily;
use crate::text::{contains_phrase, normalize};

pub struct VarietalInfo {
    pub name: &'static str,
    /// Normalized spellings that identify the grape in free text.
    pub aliases: &'static [&'static str],
    pub wine_type: WineType,
    pub aromas: &'static [AromaFamily],
}

use AromaFamily::*;

pub const VARIETALS: &[VarietalInfo] = &[
    VarietalInfo { name: "Cabernet Sauvignon", aliases: &["cabernet sauvignon", "cabernet", "cab sauv"], wine_type: WineType::Red, aromas: &[BlackFruit, Herbal, Oak] },
    VarietalInfo { name: "Merlot", aliases: &["merlot"], wine_type: WineType::Red, aromas: &[RedFruit, BlackFruit] },
    VarietalInfo { name: "Pinot Noir", aliases: &["pinot noir", "spatburgunder"], wine_type: WineType::Red, aromas: &[RedFruit, Earth] },
    VarietalInfo { name: "Syrah", aliases: &["syrah", "shiraz"], wine_type: WineType::Red, aromas: &[BlackFruit, Spice] },
    VarietalInfo { name: "Malbec", aliases: &["malbec"], wine_type: WineType::Red, aromas: &[BlackFruit] },
    VarietalInfo { name: "Nebbiolo", aliases: &["nebbiolo", "barolo", "barbaresco"], wine_type: WineType::Red, aromas: &[RedFruit, Earth, Floral] },
    VarietalInfo { name: "Sangiovese", aliases: &["sangiovese", "chianti", "brunello"], wine_type: WineType::Red, aromas: &[RedFruit, Earth, Herbal] },
    VarietalInfo { name: "Tempranillo", aliases: &["tempranillo", "rioja", "ribera del duero"], wine_type: WineType::Red, aromas: &[RedFruit, Oak, Earth] },
    VarietalInfo { name: "Grenache", aliases: &["grenache", "garnacha"], wine_type: WineType::Red, aromas: &[RedFruit, Spice] },
    VarietalInfo { name: "Zinfandel", aliases: &["zinfandel", "primitivo"], wine_type: WineType::Red, aromas: &[BlackFruit, Spice] },
    VarietalInfo { name: "Gamay", aliases: &["gamay", "beaujolais"], wine_type: WineType::Red, aromas: &[RedFruit] },
    VarietalInfo { name: "Cabernet Franc", aliases: &["cabernet franc"], wine_type: WineType::Red, aromas: &[RedFruit, Herbal] },
    VarietalInfo { name: "Chardonnay", aliases: &["chardonnay", "chablis", "meursault"], wine_type: WineType::White, aromas: &[StoneFruit, Tropical, Oak, Dairy, Nutty] },
    VarietalInfo { name: "Sauvignon Blanc", aliases: &["sauvignon blanc", "sancerre", "pouilly fume"], wine_type: WineType::White, aromas: &[Citrus, Herbal, Mineral] },
    VarietalInfo { name: "Riesling", aliases: &["riesling"], wine_type: WineType::White, aromas: &[Citrus, StoneFruit, Floral, Mineral] },
    VarietalInfo { name: "Pinot Grigio", aliases: &["pinot grigio", "pinot gris"], wine_type: WineType::White, aromas: &[Citrus, StoneFruit] },
    VarietalInfo { name: "Chenin Blanc", aliases: &["chenin blanc", "chenin", "vouvray"], wine_type: WineType::White, aromas: &[StoneFruit, Mineral, Nutty] },
    VarietalInfo { name: "Albariño", aliases: &["albarino", "alvarinho"], wine_type: WineType::White, aromas: &[Citrus, Mineral] },
    VarietalInfo { name: "Viognier", aliases: &["viognier", "condrieu"], wine_type: WineType::White, aromas: &[StoneFruit, Floral] },
    VarietalInfo { name: "Gewürztraminer", aliases: &["gewurztraminer"], wine_type: WineType::White, aromas: &[Floral, Tropical, Spice] },
    VarietalInfo { name: "Grüner Veltliner", aliases: &["gruner veltliner", "gruner"], wine_type: WineType::White, aromas: &[Citrus, Herbal] },
    VarietalInfo { name: "Glera", aliases: &["glera", "prosecco"], wine_type: WineType::Sparkling, aromas: &[Citrus, StoneFruit, Floral] },
];

/// Style words that decide the wine type regardless of grape.
const STYLE_KEYWORDS: &[(&str, WineType)] = &[
    ("champagne", WineType::Sparkling),
    ("prosecco", WineType::Sparkling),
    ("cava", WineType::Sparkling),
    ("cremant", WineType::Sparkling),
    ("franciacorta", WineType::Sparkling),
    ("sparkling", WineType::Sparkling),
    ("brut", WineType::Sparkling),
    ("spumante", WineType::Sparkling),
    ("port", WineType::Fortified),
    ("porto", WineType::Fortified),
    ("sherry", WineType::Fortified),
    ("madeira", WineType::Fortified),
    ("marsala", WineType::Fortified),
    ("sauternes", WineType::Dessert),
    ("tokaji", WineType::Dessert),
    ("ice wine", WineType::Dessert),
    ("icewine", WineType::Dessert),
    ("late harvest", WineType::Dessert),
    ("rose", WineType::Rose),
    ("rosado", WineType::Rose),
    ("rosato", WineType::Rose),
];

/// Region names that imply a colour when no grape is given.
const REGION_HINTS: &[(&str, WineType)] = &[
    ("bordeaux", WineType::Red),
    ("pomerol", WineType::Red),
    ("saint emilion", WineType::Red),
    ("cotes du rhone", WineType::Red),
    ("chateauneuf du pape", WineType::Red),
    ("napa", WineType::Red),
    ("mendoza", WineType::Red),
    ("marlborough", WineType::White),
    ("mosel", WineType::White),
    ("alsace", WineType::White),
];

/// Infers the wine type from free text (name, varietal, region). Style words
/// win over grapes, grapes over regions.
pub fn infer_wine_type(text: &str) -> Option<WineType> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }
    if let Some((_, t)) = STYLE_KEYWORDS
        .iter()
        .find(|(kw, _)| contains_phrase(&text, kw))
    {
        return Some(*t);
    }
    if let Some(v) = find_varietal(&text) {
        return Some(v.wine_type);
    }
    REGION_HINTS
        .iter()
        .find(|(kw, _)| contains_phrase(&text, kw))
        .map(|(_, t)| *t)
}

/// Varietal whose alias appears in already-normalized text. The longest
/// matching alias wins, so "cabernet franc" beats "cabernet".
pub fn find_varietal(normalized: &str) -> Option<&'static VarietalInfo> {
    let mut best: Option<(&'static VarietalInfo, usize)> = None;
    for v in VARIETALS {
        for alias in v.aliases {
            if contains_phrase(normalized, alias) && best.map_or(true, |(_, len)| alias.len() > len)
            {
                best = Some((v, alias.len()));
            }
        }
    }
    best.map(|(v, _)| v)
}

/// Grapes whose signature aromas include `family`, optionally limited to one type.
pub fn varietals_for_aroma(family: AromaFamily, wine_type: Option<WineType>) -> Vec<&'static str> {
    VARIETALS
        .iter()
        .filter(|v| v.aromas.contains(&family))
        .filter(|v| wine_type.map_or(true, |t| v.wine_type == t))
        .map(|v| v.name)
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MainIngredient {
    Beef,
    Lamb,
    Pork,
    Poultry,
    Fish,
    Shellfish,
    Vegetarian,
    Pasta,
    Spicy,
    Cheese,
    Dessert,
}

impl MainIngredient {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainIngredient::Beef => "beef",
            MainIngredient::Lamb => "lamb",
            MainIngredient::Pork => "pork",
            MainIngredient::Poultry => "poultry",
            MainIngredient::Fish => "fish",
            MainIngredient::Shellfish => "shellfish",
            MainIngredient::Vegetarian => "vegetarian dishes",
            MainIngredient::Pasta => "pasta",
            MainIngredient::Spicy => "spicy food",
            MainIngredient::Cheese => "cheese",
            MainIngredient::Dessert => "dessert",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Checked in order; spice dominates whatever protein it is cooked with.
const INGREDIENT_KEYWORDS: &[(MainIngredient, &[&str])] = &[
    (MainIngredient::Spicy, &["spicy", "curry", "chili", "chilli", "szechuan", "sichuan", "thai", "jalapeno", "vindaloo", "hot sauce"]),
    (MainIngredient::Dessert, &["dessert", "cake", "chocolate", "tart", "pie", "tiramisu", "creme brulee", "ice cream"]),
    (MainIngredient::Shellfish, &["shrimp", "prawn", "prawns", "lobster", "crab", "oyster", "oysters", "scallop", "scallops", "mussels", "clams"]),
    (MainIngredient::Fish, &["fish", "salmon", "tuna", "cod", "trout", "halibut", "sea bass", "sushi", "sole"]),
    (MainIngredient::Beef, &["beef", "steak", "burger", "brisket", "ribeye", "short rib", "veal"]),
    (MainIngredient::Lamb, &["lamb", "mutton"]),
    (MainIngredient::Pork, &["pork", "bacon", "ham", "sausage", "prosciutto", "chorizo"]),
    (MainIngredient::Poultry, &["chicken", "turkey", "duck", "quail", "poultry"]),
    (MainIngredient::Pasta, &["pasta", "pizza", "risotto", "lasagna", "spaghetti", "gnocchi"]),
    (MainIngredient::Cheese, &["cheese", "brie", "cheddar", "camembert", "parmesan", "gouda", "roquefort", "charcuterie"]),
    (MainIngredient::Vegetarian, &["salad", "vegetable", "vegetables", "mushroom", "mushrooms", "tofu", "vegetarian", "vegan", "lentils"]),
];

pub fn infer_main_ingredient(food: &str) -> Option<MainIngredient> {
    let text = normalize(food);
    INGREDIENT_KEYWORDS
        .iter()
        .find(|(_, kws)| kws.iter().any(|kw| contains_phrase(&text, kw)))
        .map(|(ingredient, _)| *ingredient)
}

/// Rows: wine type in `WineType::ALL` order. Columns: `MainIngredient` order.
const PAIRING_TABLE: [[f64; 11]; 6] = [
    // beef lamb pork poultry fish shellfish veg  pasta spicy cheese dessert
    [1.0, 1.0, 0.7, 0.5, 0.2, 0.1, 0.6, 0.8, 0.4, 0.8, 0.2], // red
    [0.2, 0.2, 0.6, 0.8, 1.0, 1.0, 0.8, 0.6, 0.8, 0.7, 0.3], // white
    [0.4, 0.5, 0.7, 0.7, 0.7, 0.8, 0.8, 0.7, 0.8, 0.6, 0.3], // rose
    [0.3, 0.3, 0.6, 0.7, 0.8, 1.0, 0.7, 0.5, 0.7, 0.8, 0.5], // sparkling
    [0.1, 0.1, 0.2, 0.2, 0.1, 0.1, 0.2, 0.1, 0.6, 0.9, 1.0], // dessert
    [0.3, 0.3, 0.2, 0.2, 0.1, 0.1, 0.2, 0.2, 0.3, 1.0, 0.9], // fortified
];

/// Neutral score when either side is unknown.
pub const NEUTRAL_PAIRING: f64 = 0.5;

pub fn pairing_score(wine_type: Option<WineType>, ingredient: Option<MainIngredient>) -> f64 {
    match (wine_type, ingredient) {
        (Some(t), Some(i)) => {
            let row = WineType::ALL.iter().position(|w| *w == t).unwrap_or(0);
            PAIRING_TABLE[row][i.index()]
        }
        _ => NEUTRAL_PAIRING,
    }
}

pub fn pairing_reason(wine_type: WineType, ingredient: MainIngredient) -> String {
    let score = pairing_score(Some(wine_type), Some(ingredient));
    let quality = if score >= 0.8 {
        "a classic match for"
    } else if score >= 0.5 {
        "a reasonable partner for"
    } else {
        "a difficult match for"
    };
    format!("{} wine is {} {}", capitalize(wine_type.as_str()), quality, ingredient.as_str())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
