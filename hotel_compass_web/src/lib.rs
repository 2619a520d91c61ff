use std::cmp::Ordering;
use std::rc::Rc;

use leptos::*;

use hotel_compass::figures;
use hotel_compass::gazetteer::{MapView, ANYWHERE, CITIES};
use hotel_compass::view::{negative_review, positive_review, recenter};
use hotel_compass::{parse_reviews, MapboxConfig, ReviewRecord, ReviewSet};

use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlSelectElement, Request, RequestInit, RequestMode, Response};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// Baked in by build.rs from the process environment; both empty strings when
// the secrets were not set at build time.
const MAPBOX_STYLE: &str = env!("MAPBOX_STYLE");
const MAPBOX_KEY: &str = env!("MAPBOX_KEY");

/// Table columns in display order, using the dashboard's column titles.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Column {
    ReviewDate,
    Hotel,
    Address,
    AverageRating,
    Nationality,
    ReviewerScore,
    NegativeReview,
    PositiveReview,
    ReviewsByReviewer,
    Lat,
    Lon,
}

const COLUMNS: [Column; 11] = [
    Column::ReviewDate,
    Column::Hotel,
    Column::Address,
    Column::AverageRating,
    Column::Nationality,
    Column::ReviewerScore,
    Column::NegativeReview,
    Column::PositiveReview,
    Column::ReviewsByReviewer,
    Column::Lat,
    Column::Lon,
];

impl Column {
    fn title(self) -> &'static str {
        match self {
            Column::ReviewDate => "Review Date",
            Column::Hotel => "Hotel",
            Column::Address => "Hotel Address",
            Column::AverageRating => "Average Rating",
            Column::Nationality => "Reviewer Nationality",
            Column::ReviewerScore => "Reviewer Score",
            Column::NegativeReview => "Negative Review",
            Column::PositiveReview => "Positive Review",
            Column::ReviewsByReviewer => "Total User Reviews Submitted",
            Column::Lat => "Lat",
            Column::Lon => "Lon",
        }
    }

    fn cell(self, record: &ReviewRecord) -> String {
        match self {
            Column::ReviewDate => record.review_date.clone(),
            Column::Hotel => record.hotel.clone(),
            Column::Address => record.address.clone(),
            Column::AverageRating => record.average_score.clone(),
            Column::Nationality => record.nationality.clone(),
            Column::ReviewerScore => record.reviewer_score.to_string(),
            Column::NegativeReview => record.negative_review.clone(),
            Column::PositiveReview => record.positive_review.clone(),
            Column::ReviewsByReviewer => record.reviews_by_reviewer.to_string(),
            Column::Lat => record.lat.to_string(),
            Column::Lon => record.lon.to_string(),
        }
    }
}

fn compare_records(a: &ReviewRecord, b: &ReviewRecord, column: Column) -> Ordering {
    match column {
        Column::ReviewDate => a.review_date.cmp(&b.review_date),
        Column::Hotel => a.hotel.cmp(&b.hotel),
        Column::Address => a.address.cmp(&b.address),
        Column::AverageRating => cmp_f64(parse_score(&a.average_score), parse_score(&b.average_score)),
        Column::Nationality => a.nationality.cmp(&b.nationality),
        Column::ReviewerScore => cmp_f64(a.reviewer_score, b.reviewer_score),
        Column::NegativeReview => a.negative_review.cmp(&b.negative_review),
        Column::PositiveReview => a.positive_review.cmp(&b.positive_review),
        Column::ReviewsByReviewer => a.reviews_by_reviewer.cmp(&b.reviews_by_reviewer),
        Column::Lat => cmp_f64(a.lat, b.lat),
        Column::Lon => cmp_f64(a.lon, b.lon),
    }
}

fn parse_score(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Home,
    About,
}

fn js_err(err: JsValue) -> String {
    format!("{err:?}")
}

/// Single startup fetch of the review CSV through the browser fetch API.
/// Any failure here is terminal for the page; there is no retry.
async fn fetch_dataset() -> Result<ReviewSet, String> {
    let mut opts = RequestInit::new();
    opts.method("GET");
    opts.mode(RequestMode::Cors);

    let request =
        Request::new_with_str_and_init(hotel_compass::DATA_URL, &opts).map_err(js_err)?;
    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "unexpected fetch response".to_string())?;
    if !resp.ok() {
        return Err(format!("dataset fetch returned HTTP {}", resp.status()));
    }
    let text = JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    let body = text
        .as_string()
        .ok_or_else(|| "dataset body was not text".to_string())?;

    let records = parse_reviews(body.as_bytes()).map_err(|err| err.to_string())?;
    ReviewSet::from_records(records).map_err(|err| err.to_string())
}

/// Serialize a JSON value into a plain JS object (not a Map) for Plotly.
fn to_js(value: &serde_json::Value) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

fn render_plot(div_id: &str, traces: &js_sys::Array, layout: &JsValue) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let Some(div) = document.get_element_by_id(div_id) {
                let plotly = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Plotly"))
                    .unwrap_or(JsValue::UNDEFINED);
                if let Ok(func) = js_sys::Reflect::get(&plotly, &JsValue::from_str("react"))
                    .or_else(|_| js_sys::Reflect::get(&plotly, &JsValue::from_str("newPlot")))
                    .and_then(|v| v.dyn_into::<js_sys::Function>())
                {
                    let div_val = JsValue::from(div);
                    let traces_val = JsValue::from(traces.clone());
                    let _ = func.call3(&JsValue::NULL, &div_val, &traces_val, layout);
                }
            }
        }
    }
}

/// Rebuild the whole map figure from the static marker layer plus a fresh
/// camera descriptor. Nothing is mutated in place between events.
fn render_map(markers: &figures::MapMarkers, view: &MapView) {
    let config = MapboxConfig::new(MAPBOX_STYLE, MAPBOX_KEY);
    let data = js_sys::Array::new();
    if let Ok(trace) = to_js(&figures::map_trace(markers)) {
        data.push(&trace);
    }
    if let Ok(layout) = to_js(&figures::map_layout(&config, view)) {
        render_plot("map_plot", &data, &layout);
    }
}

fn render_bar(set: &ReviewSet) {
    let chart = figures::bar_chart(set);
    let data = js_sys::Array::new();
    if let Ok(trace) = to_js(&figures::bar_trace(&chart)) {
        data.push(&trace);
    }
    if let Ok(layout) = to_js(&figures::bar_layout()) {
        render_plot("bar_plot", &data, &layout);
    }
}

#[component]
pub fn App() -> impl IntoView {
    let (dataset, set_dataset) = create_signal(Option::<Rc<ReviewSet>>::None);
    let (status, set_status) = create_signal(String::from("Loading reviews…"));
    let (active_tab, set_active_tab) = create_signal(Tab::Home);
    let (location, set_location) = create_signal(String::from(ANYWHERE));
    // Selection is stored as an index into the record set, not the sorted
    // view, so re-sorting never silently changes which review is shown.
    let (selected_row, set_selected_row) = create_signal(Option::<usize>::None);
    let (sort_spec, set_sort_spec) = create_signal(Option::<(Column, bool)>::None);

    spawn_local(async move {
        match fetch_dataset().await {
            Ok(set) => {
                set_status.set(format!(
                    "Loaded {} reviews across {} hotels.",
                    set.records().len(),
                    set.summaries().len()
                ));
                set_dataset.set(Some(Rc::new(set)));
            }
            Err(err) => set_status.set(format!("Failed to load reviews: {err}")),
        }
    });

    // The marker layer is derived once per dataset; recentering only ever
    // produces a new camera descriptor around it.
    let markers = create_memo(move |_| {
        dataset
            .get()
            .map(|set| Rc::new(figures::map_markers(&set)))
    });

    // Re-render the map whenever the dataset arrives or the city changes.
    create_effect(move |_| {
        let markers = match markers.get() {
            Some(markers) => markers,
            None => return,
        };
        match recenter(&location.get()) {
            Ok(map_view) => render_map(&markers, &map_view),
            Err(err) => set_status.set(err.to_string()),
        }
    });

    create_effect(move |_| {
        if let Some(set) = dataset.get() {
            render_bar(&set);
        }
    });

    let view_order = create_memo(move |_| {
        let set = match dataset.get() {
            Some(set) => set,
            None => return Vec::new(),
        };
        let mut order: Vec<usize> = (0..set.records().len()).collect();
        if let Some((column, ascending)) = sort_spec.get() {
            let records = set.records();
            order.sort_by(|&a, &b| {
                let ordering = compare_records(&records[a], &records[b], column);
                if ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        order
    });

    let positive_text = create_memo(move |_| {
        let set = match dataset.get() {
            Some(set) => set,
            None => return String::new(),
        };
        let selection: Vec<usize> = selected_row.get().into_iter().collect();
        positive_review(set.records(), &selection)
            .unwrap_or("")
            .to_string()
    });

    let negative_text = create_memo(move |_| {
        let set = match dataset.get() {
            Some(set) => set,
            None => return String::new(),
        };
        let selection: Vec<usize> = selected_row.get().into_iter().collect();
        negative_review(set.records(), &selection)
            .unwrap_or("")
            .to_string()
    });

    let header_cells = move || {
        COLUMNS
            .iter()
            .map(|&column| {
                let indicator = move || match sort_spec.get() {
                    Some((active, ascending)) if active == column => {
                        if ascending {
                            " ▲"
                        } else {
                            " ▼"
                        }
                    }
                    _ => "",
                };
                view! {
                    <th on:click=move |_| {
                        set_sort_spec.update(|spec| {
                            *spec = match *spec {
                                Some((active, ascending)) if active == column => {
                                    Some((column, !ascending))
                                }
                                _ => Some((column, true)),
                            };
                        });
                    }>
                        {column.title()}
                        {indicator}
                    </th>
                }
            })
            .collect_view()
    };

    let table_rows = move || {
        let set = match dataset.get() {
            Some(set) => set,
            None => return ().into_view(),
        };
        view_order
            .get()
            .into_iter()
            .map(|index| {
                let record = &set.records()[index];
                let cells = COLUMNS
                    .iter()
                    .map(|column| view! { <td>{column.cell(record)}</td> })
                    .collect_view();
                view! {
                    <tr
                        class:selected=move || selected_row.get() == Some(index)
                        on:click=move |_| set_selected_row.set(Some(index))
                    >
                        {cells}
                    </tr>
                }
            })
            .collect_view()
    };

    let city_options = CITIES
        .iter()
        .map(|city| view! { <option value=city.name>{city.name}</option> })
        .collect_view();

    view! {
        <main class="page">
            <header class="banner">
                <h2>"Hotel Compass"</h2>
                <h5>"A hotel visualization, based on reviews"</h5>
            </header>
            <nav class="tabs">
                <button
                    class:active=move || active_tab.get() == Tab::Home
                    on:click=move |_| set_active_tab.set(Tab::Home)
                >
                    "Home"
                </button>
                <button
                    class:active=move || active_tab.get() == Tab::About
                    on:click=move |_| set_active_tab.set(Tab::About)
                >
                    "About"
                </button>
            </nav>
            <Show when=move || active_tab.get() == Tab::Home fallback=|| ()>
                <section class="tab-copy">
                    <p>
                        "In an age where the consumer increasingly relies on algorithms to decide \
                         where to eat, what to watch and where to sleep, hotel reviews matter. A \
                         hotel's reputation can be the difference between being profitable and \
                         losing money: studies suggest that a one-point increase on a five-point \
                         review scale lets a hotel raise room prices by about eleven percent while \
                         keeping the same occupancy."
                    </p>
                    <p>
                        "The first step to increasing margins is understanding where you \
                         underperform; the second is understanding why. Numerical and written \
                         reviews answer those in turn. On this page you can explore two years of \
                         compiled reviews that guests from Australia, Canada, New Zealand and the \
                         United States wrote for hotels across Europe."
                    </p>
                </section>
            </Show>
            <Show when=move || active_tab.get() == Tab::About fallback=|| ()>
                <section class="tab-copy">
                    <p>
                        "This project began with a question: do people from different \
                         nationalities rate the same hotels differently? The underlying dataset \
                         was scraped from public reviews on Booking.com and covers 515,738 \
                         entries for European hotels between 2015 and 2017, filtered here to the \
                         chain with the most review entries and to reviewers from four \
                         English-speaking countries."
                    </p>
                </section>
            </Show>
            <section class="controls">
                <h5>"Where do you want to go next?"</h5>
                <select
                    on:change=move |ev| {
                        if let Some(target) = ev.target() {
                            if let Ok(select) = target.dyn_into::<HtmlSelectElement>() {
                                set_location.set(select.value());
                            }
                        }
                    }
                    prop:value=move || location.get()
                >
                    <option value=ANYWHERE>"Anywhere"</option>
                    {city_options}
                </select>
                <span class="status">{move || status.get()}</span>
            </section>
            <section class="panels">
                <div id="map_plot" class="map"></div>
                <div class="table-wrap">
                    <table>
                        <thead>
                            <tr>{header_cells}</tr>
                        </thead>
                        <tbody>{table_rows}</tbody>
                    </table>
                </div>
            </section>
            <section class="review">
                <h5>"Positive Review"</h5>
                <textarea
                    readonly
                    placeholder="Select a row to see the positive written review..."
                    prop:value=move || positive_text.get()
                ></textarea>
            </section>
            <section class="review">
                <h5>"Negative Review"</h5>
                <textarea
                    readonly
                    placeholder="Select a row to see the negative written review..."
                    prop:value=move || negative_text.get()
                ></textarea>
            </section>
            <section>
                <div id="bar_plot" class="bar"></div>
            </section>
            <footer>
                <p class="note">{"Hotel Compass "}{APP_VERSION}</p>
            </footer>
        </main>
    }
}

#[component]
fn ConfigError() -> impl IntoView {
    view! {
        <main class="page">
            <header class="banner">
                <h2>"Hotel Compass"</h2>
            </header>
            <p class="status">
                "Missing Mapbox configuration: set MAPBOX_STYLE and MAPBOX_KEY in the build \
                 environment, then rebuild the dashboard."
            </p>
        </main>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if MAPBOX_STYLE.is_empty() || MAPBOX_KEY.is_empty() {
        leptos::mount_to_body(|| view! { <ConfigError/> });
        return;
    }
    leptos::mount_to_body(|| view! { <App/> });
}
