// ABOUTME: Integration tests running realistic scraped-profile fields through processor chains.
// ABOUTME: Covers person, time and numeric processors combined with each reducer.

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike};
use pretty_assertions::assert_eq;
use sift_core::processors::{
    FormatTime, HighestDegreeExtract, RegexFind, RegexSub, RelativeDateResolve, Split, Strip,
    SurnameValidate, ToAge, ToInt,
};
use sift_core::{AllTruthy, IndexPick, JoinReducer, MagicList, Pipeline, Value};

fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 10, 15, 42, 7)
        .unwrap()
}

#[test]
fn profile_fields() {
    let surname = Pipeline::new().then(Strip::new()).then(SurnameValidate::new());
    assert_eq!(surname.run(Value::from(" 欧阳娜娜 ")), Some(Value::from("欧阳")));

    let degree = Pipeline::new().then(HighestDegreeExtract::new());
    assert_eq!(
        degree.run(Value::from("2010-2014 本科 / 2014-2017 硕士 计算机")),
        Some(Value::from("硕士"))
    );

    let age = Pipeline::new().then(ToAge::anchored(now()));
    assert_eq!(age.run(Value::from("1990-05-01")), Some(Value::Int(34)));
}

#[test]
fn posted_dates() {
    let posted = Pipeline::new()
        .then(Strip::new())
        .then(RelativeDateResolve::anchored(now()))
        .reduce(AllTruthy::new());
    let resolved = posted
        .run(Value::list(["今天", "3天前", "2小时前", "下周"]))
        .unwrap();
    let times: Vec<_> = resolved
        .as_list()
        .unwrap()
        .iter()
        .map(|v| *v.as_time().unwrap())
        .collect();
    assert_eq!(times.len(), 3);
    assert_eq!((times[0].day(), times[0].hour()), (10, 12));
    assert_eq!((times[1].day(), times[1].hour()), (7, 12));
    assert_eq!((times[2].day(), times[2].hour(), times[2].minute()), (10, 13, 0));
}

#[test]
fn chinese_date_template() {
    let parsed = FormatTime::new().parse("发布于 2021年3月4日 10:20").unwrap();
    assert_eq!(
        (parsed.year(), parsed.month(), parsed.day(), parsed.hour(), parsed.minute()),
        (2021, 3, 4, 10, 20)
    );
}

#[test]
fn salary_range_picks_upper_bound() {
    let upper = Pipeline::new()
        .then(RegexSub::new(r"[kK]", "000").unwrap())
        .then(RegexFind::new(r"\d+").unwrap())
        .then(ToInt::new())
        .reduce(IndexPick::new(-1));
    assert_eq!(upper.run(Value::from("15k-25k")), Some(Value::Int(25000)));
}

#[test]
fn tags_joined_after_split() {
    let tags = Pipeline::new()
        .then(Split::new("|"))
        .then(Strip::new())
        .reduce(JoinReducer::new(",").with_default("none"));
    assert_eq!(
        tags.run(Value::from("rust | tokio ||serde")),
        Some(Value::from("rust,tokio,serde"))
    );
    assert_eq!(tags.run(None), Some(Value::from("")));

    let joined = Pipeline::new().reduce(JoinReducer::new(",").with_default("none"));
    assert_eq!(joined.run(Value::list([Value::Int(3)])), Some(Value::from("none")));
}

#[test]
fn magic_list_indexing_never_panics() {
    let items: MagicList<Value> = vec![Value::from("a"), Value::from("b")].into();
    assert_eq!(items.get(-1), Some(&Value::from("b")));
    assert_eq!(items.get(5), None);
    assert_eq!(items.slice(1..10).into_vec(), vec![Value::from("b")]);
}
