use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A small dataset of 12 tracks covering the searchable columns.
pub fn tracks_df() -> DataFrame {
    df!(
        "track_uri" => (0..12).map(|i| format!("uri_{:02}", i)).collect::<Vec<String>>(),
        "title" => [
            "One More Time", "Doomsday", "Cherry", "Smalltown Boy",
            "Windowlicker", "Teardrop", "Roygbiv", "Galang",
            "Midnight City", "Genesis", "Oblivion", "Safe and Sound",
        ],
        "artist" => [
            "Daft Punk", "MF DOOM", "Daphni", "Bronski Beat",
            "Aphex Twin", "Massive Attack", "Boards of Canada", "M.I.A.",
            "M83", "Grimes", "Grimes", "Capital Cities",
        ],
        "genre" => [
            "french house", "hip hop", "electronic", "synthpop",
            "idm", "trip hop", "idm", "alternative hip hop",
            "synthwave", "art pop", "art pop", "indie pop",
        ],
        "type" => [
            "album", "album", "single", "single",
            "single", "album", "album", "album",
            "album", "album", "album", "single",
        ],
        "duration" => [
            320_000.0, 285_000.0, 223_000.0, 305_000.0,
            246_000.0, 330_000.0, 152_000.0, 214_000.0,
            244_000.0, 255_000.0, 251_000.0, 192_000.0,
        ],
        "danceability" => [
            0.81, 0.72, 0.65, 0.78, 0.44, 0.36, 0.41, 0.83,
            0.52, 0.67, 0.71, 0.75,
        ],
        "energy" => [
            0.73, 0.66, 0.58, 0.81, 0.69, 0.42, 0.33, 0.88,
            0.79, 0.61, 0.64, 0.72,
        ],
        "tempo" => [
            123.0, 89.0, 124.0, 132.0, 139.0, 78.0, 92.0, 101.0,
            105.0, 110.0, 155.0, 118.0,
        ]
    )
    .unwrap()
}

/// Write the sample dataset as a CSV file under `dir`.
pub fn write_tracks_csv(dir: &Path) -> PathBuf {
    let path = dir.join("tracks.csv");
    let mut df = tracks_df();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}
