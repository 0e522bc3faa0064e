// src/config/consts.rs

// Net config
pub const RESULTS_BASE_URL: &str = "https://www.procyclingstats.com/race/tour-de-france/2025";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const REQUEST_PAUSE_MS: u64 = 2_000; // be polite
pub const STAGE_COUNT: u32 = 21;
pub const ITT_STAGES: &[u32] = &[5];

/// Sent with every results-page request; the site rejects obvious bots.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"),
    ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Cache-Control", "max-age=0"),
];

// Rider photos
pub const WIKI_SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
pub const PHOTO_SIZE: u32 = 40;
pub const PHOTO_JPEG_QUALITY: u8 = 85;
pub const PHOTO_TIMEOUT_SECS: u64 = 10;
pub const PHOTO_PAUSE_MS: u64 = 250;
/// Larger downloads are refused rather than decoded.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

// Inputs
pub const DEFAULT_ROSTER: &str = "database_csv/riders.csv";
pub const DEFAULT_RIDERS_FULL: &str = "riders.csv";
pub const DEFAULT_STAGE_CSV: &str = "imports/etappe-1-uitslag.csv";
pub const DEFAULT_FIXED_CSV: &str = "imports/etappe-1-uitslag-fixed.csv";
pub const DEFAULT_FREE_TEXT: &str = "temp/uitslag etappe 1.txt";

// Outputs
pub const DEFAULT_STAGE_SQL: &str = "imports/import-etappe-1-uitslag.sql";
pub const DEFAULT_IMPORT_SQL: &str = "imports/import-etappe-1-from-temp.sql";
pub const DEFAULT_FETCH_SQL: &str = "import-stage-results-procyclingstats.sql";
pub const DEFAULT_CSV_SQL: &str = "import-stage-results-from-csv.sql";
pub const DEFAULT_RIDERS_SQL: &str = "import-riders-generated.sql";
pub const DEFAULT_PHOTOS_SQL: &str = "update-rider-photos.sql";

// Report previews
pub const PREVIEW_MISMATCHES: usize = 20;
pub const PREVIEW_UNMATCHED: usize = 30;
pub const PREVIEW_EXAMPLES: usize = 5;
pub const PREVIEW_CORRECTIONS: usize = 20;
pub const PREVIEW_NO_ID: usize = 15;
pub const PREVIEW_NON_FINISHERS: usize = 10;

/// First position handed to non-finishers under the placeholder policy.
pub const DNF_POSITION_BASE: u32 = 999;

pub const RULE_WIDTH: usize = 80;
