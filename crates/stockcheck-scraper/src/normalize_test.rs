use super::*;

fn brands(names: &[&str]) -> BrandSet {
    names.iter().copied().collect()
}

fn texts(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.text.as_str()).collect()
}

// -----------------------------------------------------------------------
// normalize
// -----------------------------------------------------------------------

#[test]
fn normalize_keeps_literal_and_strips_brand_unit_and_punctuation() {
    let normalizer = TitleNormalizer::new();
    let candidates = normalizer.normalize("Giant Eagle Peanut Butter, 16oz", &brands(&["giant eagle"]));
    assert_eq!(
        texts(&candidates),
        vec!["giant eagle peanut butter, 16oz", "peanut butter"]
    );
    assert_eq!(candidates[0].kind, CandidateKind::Literal);
    assert_eq!(candidates[1].kind, CandidateKind::Stripped);
}

#[test]
fn normalize_keeps_literal_when_stripping_removes_context() {
    let normalizer = TitleNormalizer::new();
    let candidates = normalizer.normalize("100% Honey", &BrandSet::new());
    assert_eq!(texts(&candidates), vec!["100% honey", "honey"]);
}

#[test]
fn normalize_omits_empty_stripped_candidate() {
    let normalizer = TitleNormalizer::new();
    let candidates = normalizer.normalize("Original 12 Pack, 16 oz", &BrandSet::new());
    assert_eq!(texts(&candidates), vec!["original 12 pack, 16 oz"]);
}

#[test]
fn normalize_blank_title_yields_nothing() {
    let normalizer = TitleNormalizer::new();
    assert!(normalizer.normalize("   ", &BrandSet::new()).is_empty());
}

#[test]
fn normalize_drops_stripped_duplicate_of_literal() {
    let normalizer = TitleNormalizer::new();
    let candidates = normalizer.normalize("peanut butter", &BrandSet::new());
    assert_eq!(texts(&candidates), vec!["peanut butter"]);
}

#[test]
fn normalize_keeps_duplicate_when_dedupe_disabled() {
    let normalizer = TitleNormalizer::new().with_dedupe(false);
    let candidates = normalizer.normalize("peanut butter", &BrandSet::new());
    assert_eq!(texts(&candidates), vec!["peanut butter", "peanut butter"]);
}

// -----------------------------------------------------------------------
// strip
// -----------------------------------------------------------------------

#[test]
fn strip_removes_english_and_grocery_stop_words() {
    let normalizer = TitleNormalizer::new();
    assert_eq!(
        normalizer.strip("original pringles potato chips can", &BrandSet::new()),
        "pringles potato chips"
    );
    assert_eq!(
        normalizer.strip("half and half, reduced fat value size", &BrandSet::new()),
        ""
    );
}

#[test]
fn strip_removes_plural_brand() {
    let normalizer = TitleNormalizer::new();
    assert_eq!(
        normalizer.strip("annies mac and cheese", &brands(&["annie"])),
        "mac cheese"
    );
}

#[test]
fn strip_removes_possessive_brand_after_apostrophe_removal() {
    let normalizer = TitleNormalizer::new();
    assert_eq!(
        normalizer.strip("trader joe's dark chocolate", &brands(&["trader joes"])),
        "dark chocolate"
    );
}

#[test]
fn strip_prefers_longest_brand() {
    let normalizer = TitleNormalizer::new();
    assert_eq!(
        normalizer.strip(
            "giant eagle market district olive oil",
            &brands(&["giant eagle", "giant eagle market district"])
        ),
        "olive oil"
    );
}

#[test]
fn strip_drops_tokens_with_digits_and_single_characters() {
    let normalizer = TitleNormalizer::new();
    assert_eq!(
        normalizer.strip("x 2lb bag of 3 apples", &BrandSet::new()),
        "bag apples"
    );
}

#[test]
fn strip_trims_punctuation_from_token_edges() {
    let normalizer = TitleNormalizer::new();
    assert_eq!(
        normalizer.strip("cheez-it crackers (baked) - snack!", &BrandSet::new()),
        "cheez-it crackers baked snack"
    );
}

#[test]
fn strip_honors_extra_stop_words() {
    let normalizer = TitleNormalizer::new().with_extra_stop_words(["Bunch"]);
    assert_eq!(normalizer.strip("bananas bunch", &BrandSet::new()), "bananas");
}

// -----------------------------------------------------------------------
// normalize_titles
// -----------------------------------------------------------------------

#[test]
fn normalize_titles_orders_literals_before_stripped() {
    let normalizer = TitleNormalizer::new();
    let titles = vec![
        RawResultItem::new("Bananas, Bunch"),
        RawResultItem::new("Organic Bananas 2 lb"),
    ];
    let candidates = normalizer.normalize_titles(&titles, &BrandSet::new());
    assert_eq!(
        texts(&candidates),
        vec![
            "bananas, bunch",
            "organic bananas 2 lb",
            "bananas bunch",
            "organic bananas",
        ]
    );
    assert_eq!(candidates[1].title_index, 1);
    assert_eq!(candidates[2].kind, CandidateKind::Stripped);
    assert_eq!(candidates[2].title_index, 0);
}

#[test]
fn normalize_titles_dedupes_across_titles() {
    let normalizer = TitleNormalizer::new();
    let titles = vec![
        RawResultItem::new("Teriyaki Sauce"),
        RawResultItem::new("teriyaki sauce"),
        RawResultItem::new(""),
    ];
    let candidates = normalizer.normalize_titles(&titles, &BrandSet::new());
    assert_eq!(texts(&candidates), vec!["teriyaki sauce"]);
}
