// Popup content fragments for map markers
//
// Fixed field order; absent fields are left out entirely.
use maud::html;

use super::emission::EmissionSource;
use super::reading::Reading;

pub fn reading_tooltip(reading: &Reading) -> String {
    let heading = match reading.country.as_deref() {
        Some(country) => format!("{}, {}", reading.display_name(), country),
        None => reading.display_name().to_string(),
    };
    let comment = reading.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());

    html! {
        strong { (heading) }
        @if let Some(pm25) = reading.pm25 {
            br; "PM2.5: " (pm25) " μg/m³"
        }
        @if let Some(aqius) = reading.aqius {
            br; "AQI (US): " (aqius)
        }
        @if let Some(aqicn) = reading.aqicn {
            br; "AQI (CN): " (aqicn)
        }
        @if let Some(tp) = reading.tp {
            br; "Temperature: " (tp) "°C"
        }
        @if let Some(comment) = comment {
            br; br; (comment)
        }
    }
    .into_string()
}

pub fn emission_tooltip(source: &EmissionSource) -> String {
    html! {
        strong { (source.source_name) }
        br; "Type: " (source.source_type)
        @if let Some(quantity) = source.emissions_quantity {
            br; "Emissions: " (quantity)
            @if let Some(units) = &source.emissions_factor_units {
                " " (units)
            }
        }
        br; "Gas: " (source.gas)
        @if let Some(capacity) = source.capacity {
            br; "Capacity: " (capacity)
        }
    }
    .into_string()
}
