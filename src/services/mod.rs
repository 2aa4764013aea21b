/// Catalog bootstrap and entity saves with apply-on-response folding.
pub mod catalog_service;
/// Competition guideline generation.
pub mod guideline_service;
/// Judgement history loading and deletion.
pub mod history_service;
/// Photo staging and batch submission.
pub mod judging_service;
/// Competition selection, panes, and URL restore.
pub mod navigation_service;
