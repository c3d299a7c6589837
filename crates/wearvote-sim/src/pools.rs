//! Fixed content pools the generators draw from.

pub const IMAGES: &[&str] = &[
    "https://picsum.photos/seed/wv-street-01/600/800",
    "https://picsum.photos/seed/wv-street-02/600/800",
    "https://picsum.photos/seed/wv-office-01/600/800",
    "https://picsum.photos/seed/wv-office-02/600/800",
    "https://picsum.photos/seed/wv-vintage-01/600/800",
    "https://picsum.photos/seed/wv-vintage-02/600/800",
    "https://picsum.photos/seed/wv-sport-01/600/800",
    "https://picsum.photos/seed/wv-sport-02/600/800",
    "https://picsum.photos/seed/wv-evening-01/600/800",
    "https://picsum.photos/seed/wv-evening-02/600/800",
    "https://picsum.photos/seed/wv-casual-01/600/800",
    "https://picsum.photos/seed/wv-casual-02/600/800",
];

pub const VIDEOS: &[&str] = &[
    "https://interactive-examples.mdn.mozilla.net/media/cc0-videos/flower.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerEscapes.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerFun.mp4",
];

pub const DESCRIPTIONS: &[&str] = &[
    "How does today's outfit look?",
    "Are these colors right for summer?",
    "Office chic, done right.",
    "In love with this vintage jacket.",
    "Trying out some street style.",
    "What would you wear with these shoes?",
    "Weekend comfort mode.",
    "Too much for a wedding?",
    "Sporty but sharp.",
    "Keeping it minimal.",
    "Thoughts on this color combo?",
    "First try with the new season pieces.",
];

pub const CATEGORIES: &[&str] = &["Street", "Office", "Vintage", "Sport", "Special Occasion", "Other"];

pub const LOCATIONS: &[&str] = &[
    "Istanbul",
    "Berlin",
    "Lisbon",
    "Brooklyn",
    "Milan",
    "Seoul",
    "Copenhagen",
    "Mexico City",
];

pub const COMMENTS: &[&str] = &[
    "You look amazing!",
    "Where did you get this?",
    "The colors work so well together.",
    "I'd have styled it a bit differently.",
    "Obsessed!",
    "So sharp.",
    "This style really suits you.",
    "Link please?",
    "How much was it?",
    "Not my favorite, sorry.",
    "Perfect match.",
    "Those shoes are legendary.",
    "Goes great with your hair.",
    "Could use one more accessory.",
    "Totally me!",
];

pub const INBOUND_MESSAGES: &[&str] = &[
    "Hey! Loved your last post.",
    "Are you free to go shopping on Saturday?",
    "Which store was that coat from?",
    "Can you help me pick an outfit for tonight?",
    "Saw your vote on my post, thanks!",
    "Did you see the new drop?",
];
