use insight_hub::data::loader::{load_bytes, SourceFormat};
use insight_hub::data::model::Dataset;
use insight_hub::session::{Action, Session};

/// The three-row city/sales table used throughout.
pub const CITY_SALES: &[u8] = b"city,sales\nA,10\nB,\nA,30\n";

pub fn csv(text: &str) -> Dataset {
    load_bytes(text.as_bytes(), SourceFormat::Csv).expect("fixture parses")
}

pub fn session_with(bytes: &[u8]) -> Session {
    let (session, _) = Session::default()
        .apply(Action::Load {
            file_name: "fixture.csv".into(),
            bytes: bytes.to_vec(),
        })
        .expect("fixture loads");
    session
}

/// Small datasets covering text/numeric/missing mixes and an empty table.
pub fn fixtures() -> Vec<Dataset> {
    vec![
        csv("city,sales\nA,10\nB,\nA,30\n"),
        csv("a,b,c\n1,x,\n,y,2.5\n3,,\nNA,x,4\n"),
        csv("region,product,units\nN,p1,3\nN,p2,\nS,p1,7\nS,p1,1\nE,,2\n"),
        csv("only_missing,label\n,a\n,b\n"),
        csv("empty,table\n"),
    ]
}
