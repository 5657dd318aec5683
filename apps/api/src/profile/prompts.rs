// Onboarding mapping prompt: system instructions, two worked examples, then
// the user's quiz payload.

pub const MAPPING_SYSTEM: &str = r#"You are a sommelier who converts a wine-taste quiz into a structured palate profile.

Return ONE JSON object with exactly these keys:
{
  "palate": {"sweetness", "acidity", "tannin", "bitterness", "body", "alcohol_warmth", "sparkle_intensity"},
  "aroma": {"affinities": [family], "aversions": [family]},
  "styles": {"oak", "malolactic_butter", "oxidative", "minerality", "fruit_ripeness"},
  "contexts": {"weeknight", "celebration", "with_food", "casual_social", "gift"},
  "dislikes": ["short phrase"],
  "confidence": number
}

RULES:
1. Every palate, styles and contexts value and confidence is a number between 0 and 1.
2. Aroma families MUST be chosen only from: citrus, stone_fruit, tropical, red_fruit,
   black_fruit, floral, herbal, spice, earth, oak, dairy, nutty, mineral.
3. Liking something raises its value above 0.5; disliking it lowers it below 0.3.
4. Novices use everyday words: "crisp" means high acidity, "smooth" means low tannin,
   "buttery" means malolactic_butter and oak, "dry" usually means low sweetness.
5. confidence reflects how much signal the answers contain, not how sure you sound."#;

pub const FEW_SHOT_USER_1: &str = r#"{"experience":"novice","free_enjoyed":"fruity reds that are smooth, nothing harsh","free_disliked":"very dry wines that make my mouth pucker","answers":{"occasion":"weeknight dinners"}}"#;

pub const FEW_SHOT_ASSISTANT_1: &str = r#"{"palate":{"sweetness":0.4,"acidity":0.4,"tannin":0.25,"bitterness":0.15,"body":0.5,"alcohol_warmth":0.4,"sparkle_intensity":0.1},"aroma":{"affinities":["red_fruit","black_fruit"],"aversions":["earth"]},"styles":{"oak":0.4,"malolactic_butter":0.3,"oxidative":0.1,"minerality":0.3,"fruit_ripeness":0.8},"contexts":{"weeknight":0.8,"celebration":0.3,"with_food":0.7,"casual_social":0.5,"gift":0.2},"dislikes":["astringent tannins"],"confidence":0.55}"#;

pub const FEW_SHOT_USER_2: &str = r#"{"experience":"expert","free_enjoyed":"old-world Nebbiolo and Northern Rhône Syrah, savoury and structured; grower Champagne for aperitif","free_disliked":"jammy, high-alcohol fruit bombs and heavy new oak","answers":{"budget":"40-120"}}"#;

pub const FEW_SHOT_ASSISTANT_2: &str = r#"{"palate":{"sweetness":0.1,"acidity":0.75,"tannin":0.8,"bitterness":0.4,"body":0.65,"alcohol_warmth":0.3,"sparkle_intensity":0.5},"aroma":{"affinities":["earth","red_fruit","spice","floral","mineral"],"aversions":["tropical","oak"]},"styles":{"oak":0.2,"malolactic_butter":0.2,"oxidative":0.4,"minerality":0.8,"fruit_ripeness":0.25},"contexts":{"weeknight":0.4,"celebration":0.8,"with_food":0.9,"casual_social":0.5,"gift":0.5},"dislikes":["jammy fruit","high alcohol","heavy new oak"],"confidence":0.9}"#;
