// Geographic primitives
pub mod geo;

// Contact roster model and validation
pub mod contact;

// Random-walk simulation and proximity filter
pub mod simulation;

// Radar disc projection
pub mod radar;

// Position providers and fallback
pub mod location;

// Assistant service integration
pub mod assistant;

// Call hand-off
pub mod telephony;

// Configuration
pub mod config;

// Radar engine and tracking sessions
pub mod state;

// HTTP and WebSocket APIs
pub mod api;

// WebSocket radar feed
pub mod subscription;
