//! Best-effort conversion of free-text model output into a displayable recipe.
//!
//! The backend answers with whatever the language model wrote, so nothing
//! here can fail: every input, however malformed, yields a complete
//! [`ParsedRecipe`] with defaults filled in.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Delicious Recipe";
pub const DEFAULT_TIME: &str = "30–45 min";
pub const DEFAULT_SERVINGS: &str = "2–4 servings";
pub const DEFAULT_STEP: &str = "Enjoy your meal!";
pub const DEFAULT_QUANTITY: &str = "as needed";

lazy_static! {
    static ref TIME_RE: Regex = Regex::new(r"(?i)\d+ ?(?:min|hour)").expect("valid time pattern");
    static ref NUMBERED_RE: Regex = Regex::new(r"^\d+\.\s").expect("valid numbered pattern");
    static ref STEP_PREFIX_RE: Regex =
        Regex::new(r"^(?:\d+\.\s+|(?i:step)\s*\d+\s*[:.)\-]?\s+)").expect("valid step pattern");
    static ref BULLET_RE: Regex = Regex::new(r"^[•*\-–]\s+(.*)$").expect("valid bullet pattern");
    static ref QUANTITY_SPLIT_RE: Regex =
        Regex::new(r"\s{2,}|\s+[-·]\s+").expect("valid split pattern");
    static ref QUANTITY_START_RE: Regex =
        Regex::new(r"^[\d½¼¾⅓⅔⅛]").expect("valid quantity start pattern");
    static ref LEADING_QUANTITY_RE: Regex = Regex::new(
        r"(?i)^((?:\d+(?:[./]\d+)?|[½¼¾⅓⅔⅛])(?:\s*(?:-|–|to)\s*\d+(?:[./]\d+)?)?(?:\s+\d+/\d+)?(?:\s*(?:cups?|tbsps?|tablespoons?|tsps?|teaspoons?|grams?|g|kg|ml|liters?|litres?|l|oz|ounces?|lbs?|pounds?|cloves?|pinch(?:es)?|cans?|slices?|pieces?|sprigs?|bunch(?:es)?|handfuls?|large|medium|small|whole)\b)*)\s+(.+)$"
    )
    .expect("valid leading quantity pattern");
    static ref TITLE_LABEL_RE: Regex =
        Regex::new(r"(?i)^(?:title|recipe(?: name)?)\s*:\s*").expect("valid title label pattern");
}

/// Headings that open the instructions section
const STEP_KEYWORDS: [&str; 4] = ["step", "instruction", "direction", "method"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

/// Structured view of one backend response. Rebuilt from scratch on every
/// response; it carries no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecipe {
    pub title: String,
    pub time: String,
    pub servings: String,
    pub ingredients: Vec<Ingredient>,
    /// Never empty
    pub steps: Vec<String>,
}

impl Default for ParsedRecipe {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            time: DEFAULT_TIME.to_string(),
            servings: DEFAULT_SERVINGS.to_string(),
            ingredients: Vec::new(),
            steps: vec![DEFAULT_STEP.to_string()],
        }
    }
}

impl fmt::Display for ParsedRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        // Both facts keep whatever label the backend gave them
        writeln!(f, "{} · {}", self.time, self.servings)?;

        if !self.ingredients.is_empty() {
            writeln!(f)?;
            writeln!(f, "Ingredients")?;
            for ingredient in &self.ingredients {
                writeln!(f, "- {} ({})", ingredient.name, ingredient.quantity)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Instructions")?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, step)?;
        }
        Ok(())
    }
}

/// Split comma-separated user input into trimmed, non-empty ingredient names.
pub fn parse_ingredients(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Classify each line of `text` and assemble a recipe.
pub fn parse_recipe(text: &str) -> ParsedRecipe {
    let lines: Vec<String> = text
        .lines()
        .map(clean_markdown)
        .filter(|l| !l.is_empty())
        .collect();

    let mut recipe = ParsedRecipe::default();
    if let Some(first) = lines.first() {
        let title = strip_wrapping_emphasis(TITLE_LABEL_RE.replace(first, "").trim()).to_string();
        if !title.is_empty() {
            recipe.title = title;
        }
    }

    let mut time_lines: Vec<&str> = Vec::new();
    let mut servings: Option<&str> = None;
    let mut steps: Vec<String> = Vec::new();
    let mut in_ingredients = false;
    let mut in_steps = false;

    for (idx, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        let bullet = BULLET_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| strip_wrapping_emphasis(m.as_str().trim()));

        // Section headings; bullets and the title never switch sections
        if idx > 0 && bullet.is_none() {
            if lower.contains("ingredient") {
                in_ingredients = true;
                in_steps = false;
            }
            if NUMBERED_RE.is_match(line) || STEP_KEYWORDS.iter().any(|k| lower.contains(k)) {
                in_steps = true;
                in_ingredients = false;
            }
        }

        // Header facts come from the preamble, not from the steps
        if idx > 0 && bullet.is_none() && !in_steps {
            if servings.is_none() && lower.contains("serving") {
                servings = Some(line.as_str());
            }
            if TIME_RE.is_match(line) {
                time_lines.push(line.as_str());
            }
        }

        if in_ingredients {
            if let Some(body) = bullet.filter(|b| !b.is_empty()) {
                recipe.ingredients.push(parse_ingredient(body));
            }
        }

        if in_steps {
            let step = match bullet {
                Some(body) => body,
                None => STEP_PREFIX_RE
                    .find(line)
                    .map(|m| line[m.end()..].trim())
                    .unwrap_or(""),
            };
            if !step.is_empty() {
                steps.push(step.to_string());
            }
        }
    }

    if let Some(servings) = servings {
        recipe.servings = servings.to_string();
    }
    if !time_lines.is_empty() {
        recipe.time = time_lines.join(" · ");
    }
    if !steps.is_empty() {
        recipe.steps = steps;
    }

    recipe
}

fn parse_ingredient(body: &str) -> Ingredient {
    let parts: Vec<&str> = QUANTITY_SPLIT_RE
        .split(body)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() > 1 {
        let (first, rest) = (parts[0], &parts[1..]);
        return if QUANTITY_START_RE.is_match(first) {
            Ingredient {
                name: rest.join(" "),
                quantity: first.to_string(),
            }
        } else {
            Ingredient {
                name: first.to_string(),
                quantity: rest.join(" "),
            }
        };
    }

    if let Some(caps) = LEADING_QUANTITY_RE.captures(body) {
        let quantity = caps.get(1).map_or("", |m| m.as_str().trim());
        let name = caps.get(2).map_or("", |m| m.as_str().trim());
        if !quantity.is_empty() && !name.is_empty() {
            return Ingredient {
                name: name.to_string(),
                quantity: quantity.to_string(),
            };
        }
    }

    Ingredient {
        name: body.to_string(),
        quantity: DEFAULT_QUANTITY.to_string(),
    }
}

/// Drop heading markers, emphasis and code ticks; the terminal shows plain text.
fn clean_markdown(line: &str) -> String {
    let line = line
        .trim()
        .trim_start_matches('#')
        .replace("**", "")
        .replace("__", "")
        .replace('`', "");
    strip_wrapping_emphasis(line.trim()).to_string()
}

/// `*text*` or `_text_` around a whole field; a `* ` bullet marker is left alone.
fn strip_wrapping_emphasis(field: &str) -> &str {
    for marker in ['*', '_'] {
        let Some(inner) = field
            .strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
        else {
            continue;
        };
        if !inner.is_empty()
            && !inner.starts_with(char::is_whitespace)
            && !inner.ends_with(char::is_whitespace)
        {
            return inner;
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZEPHYR_SAMPLE: &str = "\
**Zesty Lemon Garlic Chicken**
Servings: 2
Cooking time: 35 minutes

Ingredients:
- 2  chicken breasts
- 1 cup rice
- 3 cloves garlic, minced
- Salt - to taste

Instructions:
1. Rinse the rice.
2. Cook the chicken for 10 minutes.
3. Serve hot.
";

    fn ingredient(name: &str, quantity: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity: quantity.to_string(),
        }
    }

    #[test]
    fn test_parse_ingredients_splits_and_trims() {
        assert_eq!(
            parse_ingredients("chicken, rice , , garlic,lemon "),
            vec!["chicken", "rice", "garlic", "lemon"]
        );
    }

    #[test]
    fn test_parse_ingredients_blank_input() {
        assert!(parse_ingredients("").is_empty());
        assert!(parse_ingredients(" , ,, ").is_empty());
    }

    #[test]
    fn test_parse_ingredients_single_item() {
        assert_eq!(parse_ingredients("  tofu  "), vec!["tofu"]);
    }

    #[test]
    fn test_empty_text_yields_defaults() {
        let recipe = parse_recipe("");
        assert_eq!(recipe, ParsedRecipe::default());
        assert_eq!(recipe.title, DEFAULT_TITLE);
        assert_eq!(recipe.time, DEFAULT_TIME);
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.steps, vec![DEFAULT_STEP]);
    }

    #[test]
    fn test_full_recipe() {
        let recipe = parse_recipe(ZEPHYR_SAMPLE);
        assert_eq!(recipe.title, "Zesty Lemon Garlic Chicken");
        assert_eq!(recipe.servings, "Servings: 2");
        assert_eq!(recipe.time, "Cooking time: 35 minutes");
        assert_eq!(
            recipe.ingredients,
            vec![
                ingredient("chicken breasts", "2"),
                ingredient("rice", "1 cup"),
                ingredient("garlic, minced", "3 cloves"),
                ingredient("Salt", "to taste"),
            ]
        );
        assert_eq!(
            recipe.steps,
            vec![
                "Rinse the rice.",
                "Cook the chicken for 10 minutes.",
                "Serve hot.",
            ]
        );
    }

    #[test]
    fn test_step_timings_do_not_override_header_time() {
        let recipe = parse_recipe("Baked Oats\nSteps:\n1. Bake for 25 minutes.\n2. Cool.");
        assert_eq!(recipe.time, DEFAULT_TIME);
        assert_eq!(recipe.steps, vec!["Bake for 25 minutes.", "Cool."]);
    }

    #[test]
    fn test_step_word_in_title_keeps_header_facts() {
        let text = "One-Step Lemon Chicken\nServings: 2\nCooking time: 30 minutes\nIngredients:\n- 1 lemon\nInstructions:\n1. Cook.";
        let recipe = parse_recipe(text);
        assert_eq!(recipe.title, "One-Step Lemon Chicken");
        assert_eq!(recipe.servings, "Servings: 2");
        assert_eq!(recipe.time, "Cooking time: 30 minutes");
        assert_eq!(recipe.ingredients, vec![ingredient("lemon", "1")]);
        assert_eq!(recipe.steps, vec!["Cook."]);

        let recipe = parse_recipe("Sheet-Pan Method Salmon\nServings: 4\n1. Roast.");
        assert_eq!(recipe.servings, "Servings: 4");
        assert_eq!(recipe.steps, vec!["Roast."]);
    }

    #[test]
    fn test_single_emphasis_is_stripped() {
        let text = "*Zesty Chicken*\n_Servings: 2_\nIngredients:\n- *Fresh basil*\n* Lettuce\nSteps:\n1. Toss.";
        let recipe = parse_recipe(text);
        assert_eq!(recipe.title, "Zesty Chicken");
        assert_eq!(recipe.servings, "Servings: 2");
        assert_eq!(
            recipe.ingredients,
            vec![ingredient("Fresh basil", DEFAULT_QUANTITY), ingredient("Lettuce", DEFAULT_QUANTITY)]
        );
        assert_eq!(strip_wrapping_emphasis("5 * 3 *"), "5 * 3 *");
        assert_eq!(strip_wrapping_emphasis("**"), "**");
    }

    #[test]
    fn test_multiple_time_lines_are_joined() {
        let recipe = parse_recipe("Sunny Skillet\nPrep time: 10 min\nCook time: 20 minutes\nServes 2");
        assert_eq!(recipe.time, "Prep time: 10 min · Cook time: 20 minutes");
        // "Serves" is not "serving"
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
    }

    #[test]
    fn test_title_label_and_heading_markers_are_stripped() {
        assert_eq!(parse_recipe("Title: Midnight Fried Rice").title, "Midnight Fried Rice");
        assert_eq!(parse_recipe("## Recipe: Green Shakshuka").title, "Green Shakshuka");
        assert_eq!(parse_recipe("Title:").title, DEFAULT_TITLE);
    }

    #[test]
    fn test_step_prefixed_lines() {
        let text = "Tomato Pasta\n**Step 1:** Boil water\nStep 2. Add pasta\nStep 3 Drain";
        let recipe = parse_recipe(text);
        assert_eq!(recipe.steps, vec!["Boil water", "Add pasta", "Drain"]);
    }

    #[test]
    fn test_bulleted_instructions() {
        let text = "Simple Salad\nIngredients:\n* Lettuce\nDirections:\n- Wash the lettuce\n- Toss";
        let recipe = parse_recipe(text);
        assert_eq!(recipe.ingredients, vec![ingredient("Lettuce", DEFAULT_QUANTITY)]);
        assert_eq!(recipe.steps, vec!["Wash the lettuce", "Toss"]);
    }

    #[test]
    fn test_ingredient_quantity_shapes() {
        let text = "Test\nIngredients\n• 1 1/2 cups flour\n• 200g butter\n• ½ tsp salt\n• Olive oil  2 tbsp\n• 2 large eggs\n• 2 garlic bulbs";
        let recipe = parse_recipe(text);
        assert_eq!(
            recipe.ingredients,
            vec![
                ingredient("flour", "1 1/2 cups"),
                ingredient("butter", "200g"),
                ingredient("salt", "½ tsp"),
                ingredient("Olive oil", "2 tbsp"),
                ingredient("eggs", "2 large"),
                ingredient("garlic bulbs", "2"),
            ]
        );
    }

    #[test]
    fn test_hyphenated_words_are_not_bullets() {
        let text = "Stir-Fry\nIngredients:\nstir-fry sauce to taste\n- 1 pepper";
        let recipe = parse_recipe(text);
        assert_eq!(recipe.ingredients, vec![ingredient("pepper", "1")]);
    }

    #[test]
    fn test_numbered_step_after_ingredients_closes_section() {
        let text = "Eggs\nIngredients:\n- 2 eggs\n1. Whisk the eggs\n- stray bullet";
        let recipe = parse_recipe(text);
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.steps, vec!["Whisk the eggs", "stray bullet"]);
    }

    #[test]
    fn test_malformed_input_never_panics() {
        let inputs = [
            "???\n\n***\n- \n1.",
            "-\n*\n•\n–",
            "Ingredients\n-    \n- ·  · \nStep\nstep 9:",
            "🍳🍳🍳\n- ½\n1. ",
            "\n\n\n",
            "ingredient ingredient step step 1. 2. 3.",
        ];
        for input in inputs {
            let recipe = parse_recipe(input);
            assert!(!recipe.title.is_empty());
            assert!(!recipe.steps.is_empty());
        }
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let recipe = parse_recipe("Just some chatter about food with no structure at all.");
        assert_eq!(recipe.title, "Just some chatter about food with no structure at all.");
        assert_eq!(recipe.time, DEFAULT_TIME);
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert_eq!(recipe.steps, vec![DEFAULT_STEP]);
    }

    #[test]
    fn test_display_is_plain_text() {
        let rendered = parse_recipe(ZEPHYR_SAMPLE).to_string();
        assert!(rendered.starts_with("Zesty Lemon Garlic Chicken\n"));
        assert!(rendered.contains("Cooking time: 35 minutes · "));
        assert!(rendered.contains("- rice (1 cup)"));
        assert!(rendered.contains("3. Serve hot."));
    }
}
