// Module exports for pure logic
pub mod navigation;   // URL splitting, menu matching, breadcrumb trail
pub mod tabs;         // Hash-driven settings tabs
pub mod wait;         // Bounded wait for late elements
pub mod sidebar;      // Collapse, dark mode, menu highlight
pub mod breadcrumbs;  // Breadcrumb list rendering
pub mod chrome;       // Profile dropdown, alerts, confirm modal
