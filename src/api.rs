use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::info;
use serde::{Deserialize, Serialize};

use crate::puzzle::{Coordinate, ParseError, Puzzle};
use crate::solver;

/// The two API routes. Logging and trace layers are attached by the
/// binary; tests drive this router directly.
pub fn router() -> Router {
    Router::new()
        .route("/api/solve", post(solve_puzzle))
        .route("/api/check", post(check_placement))
}

#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    puzzle: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    puzzle: Option<String>,
    coordinate: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct SolveResponse {
    solution: String,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflict: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

/// Everything the two endpoints can reject. All variants are terminal and
/// non-retryable; each maps to a fixed JSON message sent with HTTP 200 —
/// the status code never carries the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// `/api/solve` without a puzzle.
    MissingField,
    /// `/api/check` with any of its three fields absent or empty.
    MissingFields,
    InvalidCharacters,
    InvalidLength,
    InvalidCoordinate,
    InvalidValue,
    /// Self-contradictory grid, or one the solver cannot finish. Budget
    /// expiry folds into this outcome.
    Unsolvable,
}

impl ApiError {
    fn message(self) -> &'static str {
        match self {
            ApiError::MissingField => "Required field missing",
            ApiError::MissingFields => "Required field(s) missing",
            ApiError::InvalidCharacters => "Invalid characters in puzzle",
            ApiError::InvalidLength => "Expected puzzle to be 81 characters long",
            ApiError::InvalidCoordinate => "Invalid coordinate",
            ApiError::InvalidValue => "Invalid value",
            ApiError::Unsolvable => "Puzzle cannot be solved",
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::InvalidCharacters => ApiError::InvalidCharacters,
            ParseError::InvalidLength => ApiError::InvalidLength,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Json(ErrorResponse {
            error: self.message(),
        })
        .into_response()
    }
}

async fn solve_puzzle(
    Json(payload): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, ApiError> {
    info!("solve requested");
    let text = payload
        .puzzle
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingField)?;
    let puzzle: Puzzle = text.parse()?;
    if !puzzle.is_consistent() {
        info!("puzzle contradicts itself");
        return Err(ApiError::Unsolvable);
    }
    let solution = solver::solve(&puzzle).ok_or(ApiError::Unsolvable)?;
    info!("puzzle solved");
    Ok(Json(SolveResponse {
        solution: solution.to_string(),
    }))
}

async fn check_placement(
    Json(payload): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    info!("placement check requested");
    let (puzzle, coordinate, value) = match (payload.puzzle, payload.coordinate, payload.value) {
        (Some(p), Some(c), Some(v)) if !p.is_empty() && !c.is_empty() && !v.is_empty() => {
            (p, c, v)
        }
        _ => return Err(ApiError::MissingFields),
    };
    let value = parse_value(&value).ok_or(ApiError::InvalidValue)?;
    let coordinate = Coordinate::parse(&coordinate).ok_or(ApiError::InvalidCoordinate)?;
    let puzzle: Puzzle = puzzle.parse()?;

    // Clear the target cell so a value re-checked against its own position
    // never conflicts with itself.
    let grid = puzzle.with_cell_cleared(coordinate.index());
    let row = coordinate.row();
    let col = coordinate.col();

    let mut conflict = Vec::new();
    if !grid.check_col_placement(row, col, value) {
        conflict.push("column");
    }
    if !grid.check_row_placement(row, col, value) {
        conflict.push("row");
    }
    if !grid.check_region_placement(row, col, value) {
        conflict.push("region");
    }

    info!("placement check done, {} conflicts", conflict.len());
    if conflict.is_empty() {
        Ok(Json(CheckResponse {
            valid: true,
            conflict: None,
        }))
    } else {
        Ok(Json(CheckResponse {
            valid: false,
            conflict: Some(conflict),
        }))
    }
}

/// A value field is a single digit 1-9, nothing else.
fn parse_value(input: &str) -> Option<u8> {
    match input.as_bytes() {
        &[digit @ b'1'..=b'9'] => Some(digit - b'0'),
        _ => None,
    }
}
