/// Marketplace and FX endpoints plus the closed weapon catalog.
/// Config defaults are drawn from here so the CLI and tests agree on one source.

// Marketplace
pub const BASE_URL: &str = "https://csgoskins.gg";
pub const WEAPONS_PATH: &str = "weapons";

// FX source
pub const FX_ENDPOINT: &str = "https://api.frankfurter.app/latest";
pub const FX_PROVIDER: &str = "frankfurter.app";
pub const FX_FALLBACK_PROVIDER: &str = "fallback";
pub const BASE_CURRENCY: &str = "USD";
pub const TARGET_CURRENCY: &str = "AZN";
pub const FALLBACK_USD_TO_AZN: f64 = 1.7;

// Harvest policy
pub const PRICE_LIMIT_AZN: f64 = 20.0;
pub const CATEGORY_PACING_MS: u64 = 220;
pub const FETCH_MAX_ATTEMPTS: u32 = 4;
pub const FETCH_BACKOFF_UNIT_MS: u64 = 600;
pub const RATE_LIMITED_STATUS: u16 = 429;

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/131.0.0.0 Safari/537.36";

// Output layout
pub const OUTPUT_DIR: &str = "public/data";
pub const PER_WEAPON_DIR: &str = "weapons";
pub const FILE_SUFFIX: &str = "under-20-azn";
pub const AGGREGATE_FILE_STEM: &str = "all-guns";
pub const LEGACY_SLUG: &str = "scar-20";
pub const LEGACY_FILE_STEM: &str = "scar20";

/// Slugs that appear under `/weapons/` but are never guns.
pub const EXCLUDED_WEAPON_SLUGS: &[&str] = &["a"];

/// Case-insensitive substrings marking cosmetic (non-gun) categories.
pub const EXCLUDED_WEAPON_PATTERNS: &[&str] = &["knife", "glove", "wrap", "bayonet"];

/// Every gun category the harvester is allowed to scrape, in ascending order.
pub const KNOWN_GUN_SLUGS: &[&str] = &[
    "ak-47",
    "aug",
    "awp",
    "cz75-auto",
    "desert-eagle",
    "dual-berettas",
    "famas",
    "five-seven",
    "g3sg1",
    "galil-ar",
    "glock-18",
    "m249",
    "m4a1-s",
    "m4a4",
    "mac-10",
    "mag-7",
    "mp5-sd",
    "mp7",
    "mp9",
    "negev",
    "nova",
    "p2000",
    "p250",
    "p90",
    "pp-bizon",
    "r8-revolver",
    "sawed-off",
    "scar-20",
    "sg-553",
    "ssg-08",
    "tec-9",
    "ump-45",
    "usp-s",
    "xm1014",
    "zeus-x27",
];

pub fn is_known_gun_slug(slug: &str) -> bool {
    KNOWN_GUN_SLUGS.contains(&slug)
}

/// Full allow-list, sorted ascending.
pub fn all_gun_slugs() -> Vec<String> {
    let mut slugs: Vec<String> = KNOWN_GUN_SLUGS.iter().map(|s| s.to_string()).collect();
    slugs.sort();
    slugs
}
