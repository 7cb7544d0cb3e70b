mod export_dto;

pub use export_dto::ExportQuery;
