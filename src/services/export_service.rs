use rust_xlsxwriter::*;

use crate::error::Result;
use crate::models::audit_log::AuditLog;

pub struct ExportService;

impl ExportService {
    /// Moderation history as a styled XLSX workbook, newest entry first.
    pub fn audit_logs_xlsx(logs: &[AuditLog]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Audit log")?;

        let primary_color = Color::RGB(0x0C4A6E);
        let header_bg = Color::RGB(0x075985);
        let border_color = Color::RGB(0xE2E8F0);
        let delete_color = Color::RGB(0xEF4444);
        let update_color = Color::RGB(0xF59E0B);

        let columns = [
            ("#", 6.0),
            ("Date", 20.0),
            ("Action", 18.0),
            ("Entity", 14.0),
            ("Entity ID", 38.0),
            ("Actor ID", 38.0),
            ("Reason", 40.0),
            ("IP", 16.0),
            ("Details", 50.0),
        ];
        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }
        let last_col = (columns.len() - 1) as u16;

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        worksheet.merge_range(0, 0, 0, last_col, "Moderation audit log", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0xBAE6FD))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(1, 22)?;
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        let subtitle = format!("Exported {}  •  {} entries", now, logs.len());
        worksheet.merge_range(1, 0, 1, last_col, &subtitle, &subtitle_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let header_row = 2;
        worksheet.set_row_height(header_row, 26)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 3;
        for (idx, log) in logs.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let base_fmt = Format::new()
                .set_font_size(10)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color)
                .set_background_color(if idx % 2 == 0 {
                    Color::RGB(0xF8FAFC)
                } else {
                    Color::White
                });
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let wrap_fmt = base_fmt.clone().set_text_wrap();

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
            let date = log.created_at.format("%Y-%m-%d %H:%M").to_string();
            worksheet.write_string_with_format(row, 1, &date, &center_fmt)?;

            let action_fmt = if log.action.ends_with("delete") {
                center_fmt.clone().set_bold().set_font_color(delete_color)
            } else if log.action.ends_with("update") {
                center_fmt.clone().set_bold().set_font_color(update_color)
            } else {
                center_fmt.clone()
            };
            worksheet.write_string_with_format(row, 2, &log.action, &action_fmt)?;
            worksheet.write_string_with_format(row, 3, &log.entity_type, &center_fmt)?;
            worksheet.write_string_with_format(row, 4, log.entity_id.to_string(), &base_fmt)?;
            let actor = log
                .actor_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "system".to_string());
            worksheet.write_string_with_format(row, 5, &actor, &base_fmt)?;
            worksheet.write_string_with_format(row, 6, log.reason.as_deref().unwrap_or("-"), &wrap_fmt)?;
            let ip = log
                .ip_address
                .map(|ip| ip.ip().to_string())
                .unwrap_or_else(|| "-".to_string());
            worksheet.write_string_with_format(row, 7, &ip, &center_fmt)?;
            let details = log
                .metadata
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_default();
            worksheet.write_string_with_format(row, 8, &details, &wrap_fmt)?;
        }

        worksheet.set_freeze_panes(3, 0)?;
        let last_row = (data_start_row + logs.len() as u32).saturating_sub(1).max(header_row);
        worksheet.autofilter(header_row, 0, last_row, last_col)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
