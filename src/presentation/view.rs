//! Terminal rendering for query results.

use crate::domain::mode::OperatingMode;
use crate::domain::model::{
    ContentType, DataOrigin, OperatingInfo, Place, PlaceImage, RecentKeyword,
};
use crate::presentation::theme::Theme;
use colored::Colorize;
use std::fmt::Write;

pub fn source_indicator(origin: DataOrigin, enable_emoji: bool) -> String {
    let text = match (origin, enable_emoji) {
        (DataOrigin::LocalCache, true) => "💾 [cached]",
        (DataOrigin::LocalCache, false) => "[cached]",
        (DataOrigin::Remote, true) => "🌐 [live]",
        (DataOrigin::Remote, false) => "[live]",
        (DataOrigin::Fallback, true) => "🎭 [sample]",
        (DataOrigin::Fallback, false) => "[sample]",
    };
    text.cyan().to_string()
}

fn type_tag(place: &Place, enable_emoji: bool) -> Option<String> {
    let content_type = place.content_type()?;
    if !enable_emoji {
        return Some(content_type.label().to_string());
    }
    let emoji = match content_type {
        ContentType::TouristSpot => "🏞️",
        ContentType::CulturalFacility => "🏛️",
        ContentType::Festival => "🎆",
        ContentType::TravelCourse => "🥾",
        ContentType::LeisureSports => "🚣",
        ContentType::Lodging => "🛏️",
        ContentType::Shopping => "🛍️",
        ContentType::Restaurant => "🍜",
    };
    Some(format!("{} {}", emoji, content_type.label()))
}

pub fn format_place_list(
    places: &[Place],
    origin: Option<DataOrigin>,
    theme: &Theme,
    enable_emoji: bool,
) -> String {
    let mut output = String::new();

    if let Some(origin) = origin {
        writeln!(output, "{}", source_indicator(origin, enable_emoji)).ok();
    }
    if places.is_empty() {
        writeln!(output, "  {}", (theme.notice)("nothing found")).ok();
        return output;
    }

    for (i, place) in places.iter().enumerate() {
        let mut header = format!(
            "  {}. {}",
            (theme.idx)(&(i + 1).to_string()),
            (theme.title)(&place.title)
        );
        if place.is_favorite {
            let star = if enable_emoji { "★" } else { "*" };
            header.push_str(&format!(" {}", (theme.favorite)(star)));
        }
        if let Some(tag) = type_tag(place, enable_emoji) {
            header.push_str(&format!("  {}", (theme.category)(&tag)));
        }
        writeln!(output, "{}", header).ok();

        if let Some(addr) = &place.addr {
            writeln!(output, "     {}", (theme.value)(addr)).ok();
        }
        if let Some(distance) = place.distance {
            writeln!(
                output,
                "     {}",
                (theme.distance)(&format_distance(distance))
            )
            .ok();
        }
        if let Some(event) = &place.event {
            writeln!(
                output,
                "     {} {} ~ {}",
                (theme.label)("dates"),
                (theme.value)(&event.start_date),
                (theme.value)(&event.end_date)
            )
            .ok();
        }
        writeln!(output, "     {} {}", (theme.label)("id"), place.content_id).ok();
    }

    output
}

pub fn format_place_detail(
    place: &Place,
    info: Option<&OperatingInfo>,
    images: &[PlaceImage],
    origin: DataOrigin,
    theme: &Theme,
    enable_emoji: bool,
) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "{} {}",
        (theme.title)(&place.title),
        source_indicator(origin, enable_emoji)
    )
    .ok();

    let cutoff = "⸺".repeat(40);
    writeln!(output, "{}", (theme.line)(&cutoff)).ok();

    if let Some(tag) = type_tag(place, enable_emoji) {
        writeln!(output, "  {}", (theme.category)(&tag)).ok();
    }
    if let Some(addr) = &place.addr {
        writeln!(output, "  {} {}", (theme.label)("address"), (theme.value)(addr)).ok();
    }
    if let Some(tel) = &place.tel {
        writeln!(output, "  {} {}", (theme.label)("tel"), (theme.value)(tel)).ok();
    }
    if let (Some(x), Some(y)) = (place.map_x, place.map_y) {
        writeln!(
            output,
            "  {} {:.4}, {:.4}",
            (theme.label)("coords"),
            y,
            x
        )
        .ok();
    }
    if let Some(event) = &place.event {
        writeln!(
            output,
            "  {} {} ~ {}",
            (theme.label)("dates"),
            (theme.value)(&event.start_date),
            (theme.value)(&event.end_date)
        )
        .ok();
    }
    if let Some(overview) = &place.overview {
        writeln!(output).ok();
        writeln!(output, "  {}", (theme.value)(overview)).ok();
    }

    if let Some(info) = info {
        writeln!(output).ok();
        for (label, value) in operating_info_rows(info) {
            writeln!(output, "  {} {}", (theme.label)(label), (theme.value)(&value)).ok();
        }
    }

    if !images.is_empty() {
        writeln!(output).ok();
        for image in images {
            writeln!(output, "  {} {}", (theme.label)("image"), image.origin_url).ok();
        }
    }

    output
}

fn operating_info_rows(info: &OperatingInfo) -> Vec<(&'static str, String)> {
    let mut rows: Vec<(&'static str, Option<&String>)> = Vec::new();
    match info {
        OperatingInfo::TouristSpot {
            use_time,
            rest_date,
            parking,
            phone,
        } => {
            rows.push(("hours", use_time.as_ref()));
            rows.push(("closed", rest_date.as_ref()));
            rows.push(("parking", parking.as_ref()));
            rows.push(("info", phone.as_ref()));
        }
        OperatingInfo::CulturalFacility {
            use_fee,
            use_time,
            rest_date,
            parking,
        } => {
            rows.push(("fee", use_fee.as_ref()));
            rows.push(("hours", use_time.as_ref()));
            rows.push(("closed", rest_date.as_ref()));
            rows.push(("parking", parking.as_ref()));
        }
        OperatingInfo::Festival {
            play_time,
            event_place,
            use_fee,
            sponsor,
        } => {
            rows.push(("hours", play_time.as_ref()));
            rows.push(("venue", event_place.as_ref()));
            rows.push(("fee", use_fee.as_ref()));
            rows.push(("host", sponsor.as_ref()));
        }
        OperatingInfo::TravelCourse {
            total_distance,
            take_time,
            schedule,
        } => {
            rows.push(("length", total_distance.as_ref()));
            rows.push(("duration", take_time.as_ref()));
            rows.push(("schedule", schedule.as_ref()));
        }
        OperatingInfo::LeisureSports {
            open_period,
            reservation,
            use_fee,
            parking,
        } => {
            rows.push(("season", open_period.as_ref()));
            rows.push(("booking", reservation.as_ref()));
            rows.push(("fee", use_fee.as_ref()));
            rows.push(("parking", parking.as_ref()));
        }
        OperatingInfo::Lodging {
            checkin_time,
            checkout_time,
            room_count,
            reservation_url,
        } => {
            rows.push(("check-in", checkin_time.as_ref()));
            rows.push(("check-out", checkout_time.as_ref()));
            rows.push(("rooms", room_count.as_ref()));
            rows.push(("booking", reservation_url.as_ref()));
        }
        OperatingInfo::Shopping {
            open_time,
            rest_date,
            sale_item,
            parking,
        } => {
            rows.push(("hours", open_time.as_ref()));
            rows.push(("closed", rest_date.as_ref()));
            rows.push(("goods", sale_item.as_ref()));
            rows.push(("parking", parking.as_ref()));
        }
        OperatingInfo::Restaurant {
            first_menu,
            open_time,
            rest_date,
            parking,
        } => {
            rows.push(("signature", first_menu.as_ref()));
            rows.push(("hours", open_time.as_ref()));
            rows.push(("closed", rest_date.as_ref()));
            rows.push(("parking", parking.as_ref()));
        }
    }
    rows.into_iter()
        .filter_map(|(label, value)| Some((label, value?.clone())))
        .collect()
}

pub fn format_keywords(keywords: &[RecentKeyword], theme: &Theme) -> String {
    let mut output = String::new();
    if keywords.is_empty() {
        writeln!(output, "  {}", (theme.notice)("no recent searches")).ok();
        return output;
    }
    for (i, kw) in keywords.iter().enumerate() {
        writeln!(
            output,
            "  {}. {}",
            (theme.idx)(&(i + 1).to_string()),
            (theme.value)(&kw.keyword)
        )
        .ok();
    }
    output
}

pub fn mode_banner(mode: &OperatingMode, theme: &Theme, enable_emoji: bool) -> Option<String> {
    match mode {
        OperatingMode::Normal => None,
        OperatingMode::Offline => {
            let prefix = if enable_emoji { "✈️ " } else { "" };
            Some((theme.notice)(&format!(
                "{}offline, showing cached data where available",
                prefix
            )))
        }
        OperatingMode::MockFallback { reason } => {
            let prefix = if enable_emoji { "🎭 " } else { "" };
            Some((theme.notice)(&format!("{}{}", prefix, reason)))
        }
    }
}

fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1}km away", meters / 1000.0)
    } else {
        format!("{:.0}m away", meters)
    }
}
