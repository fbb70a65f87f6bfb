//! Sample diary used to seed an empty database and as test data.

use jiff::{ToSpan, civil::Date};

use crate::models::{EntryInput, LookupCategory, LookupInput, MovieInput};

pub struct SampleEntry {
    pub entry: EntryInput,
    pub lookups: Vec<LookupInput>,
}

/// Three entries watched 2, 5 and 10 days before `today`, rated 5, 3 and 4.
pub fn sample_entries(today: Date) -> Vec<SampleEntry> {
    vec![
        SampleEntry {
            entry: EntryInput {
                movie: MovieInput {
                    tmdb_id: Some(550),
                    title: "Fight Club".to_string(),
                    year: Some(1999),
                    poster_url: Some(
                        "https://image.tmdb.org/t/p/w185/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string(),
                    ),
                    director: Some("David Fincher".to_string()),
                    genre: Some("Drama".to_string()),
                    overview: Some(
                        "A depressed man suffering from insomnia meets a strange soap salesman \
                         named Tyler Durden and soon finds himself living in his squalid house \
                         after his perfect apartment is destroyed."
                            .to_string(),
                    ),
                },
                watched_at: days_before(today, 2),
                location: "Home".to_string(),
                rating: 5,
                notes: "First rule of Fight Club...".to_string(),
                watched_with: "Sarah".to_string(),
            },
            lookups: vec![LookupInput {
                question: "Where was the Paper Street house?".to_string(),
                answer: "The house was located in Wilmington, Delaware".to_string(),
                category: LookupCategory::Location,
                url: None,
            }],
        },
        SampleEntry {
            entry: EntryInput {
                movie: MovieInput {
                    tmdb_id: Some(27205),
                    title: "Inception".to_string(),
                    year: Some(2010),
                    poster_url: Some(
                        "https://image.tmdb.org/t/p/w185/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg".to_string(),
                    ),
                    director: Some("Christopher Nolan".to_string()),
                    genre: Some("Sci-Fi".to_string()),
                    overview: Some(
                        "Cobb, a skilled thief who commits corporate espionage by infiltrating \
                         the subconscious of his targets is offered a chance to regain his old \
                         life as payment for a task considered to be impossible: inception."
                            .to_string(),
                    ),
                },
                watched_at: days_before(today, 5),
                location: "Cinema".to_string(),
                rating: 3,
                notes: "The ending still gets me every time. Is it real or not?".to_string(),
                watched_with: String::new(),
            },
            lookups: vec![
                LookupInput {
                    question: "Who composed the score?".to_string(),
                    answer: "Hans Zimmer".to_string(),
                    category: LookupCategory::Trivia,
                    url: None,
                },
                LookupInput {
                    question: "Where was the rotating hallway filmed?".to_string(),
                    answer: "Cardington Studios in Bedfordshire, UK".to_string(),
                    category: LookupCategory::Location,
                    url: None,
                },
            ],
        },
        SampleEntry {
            entry: EntryInput {
                movie: MovieInput {
                    tmdb_id: Some(680),
                    title: "Pulp Fiction".to_string(),
                    year: Some(1994),
                    poster_url: Some(
                        "https://image.tmdb.org/t/p/w185/d5iIlFn5s0ImszYzBPb8JPIfbXD.jpg".to_string(),
                    ),
                    director: Some("Quentin Tarantino".to_string()),
                    genre: Some("Crime".to_string()),
                    overview: Some(
                        "A burger-loving hit man, his philosophical partner, a drug-addled \
                         gangster's moll and a washed-up boxer converge in this sprawling, \
                         comedic crime caper."
                            .to_string(),
                    ),
                },
                watched_at: days_before(today, 10),
                location: "In-flight".to_string(),
                rating: 4,
                notes: "A masterpiece of non-linear storytelling.".to_string(),
                watched_with: "Mike".to_string(),
            },
            lookups: Vec::new(),
        },
    ]
}

fn days_before(today: Date, days: i64) -> Date {
    today.checked_sub(days.days()).unwrap_or(today)
}
