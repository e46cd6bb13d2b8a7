use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::Args;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tasktide::domain::{Difficulty, FocusTimer, Mood, Priority, Task, TaskDraft};
use tasktide::flow::onboarding::{COMMUNICATION_OPTIONS, OVERWHELM_OPTIONS, TASK_CATEGORIES};
use tasktide::flow::{OnboardingEvent, OnboardingStep, OnboardingWizard, ReflectionEvent, ReflectionStep, ReflectionWizard};
use tasktide::organizer::{celebration_message, is_overdue, DateFilter, SortKey, StatusFilter, TaskQuery};
use tasktide::persistence::{ensure_tide_dir, load_settings, settings_file, store_file, FileStore};
use tasktide::session::Session;
use tasktide::ticker::tick_duration;
use tracing::debug;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Match against title, description and category
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// all, completed, incomplete, high, medium, low
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
    #[arg(short, long)]
    pub category: Option<String>,
    /// all, today, tomorrow, this-week, overdue, no-date
    #[arg(short, long, default_value = "all")]
    pub date: DateFilter,
    /// priority, difficulty, time, due, category
    #[arg(long, default_value = "priority")]
    pub sort: SortKey,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(short, long)]
    pub category: Option<String>,
    /// 1 = easy, 2 = medium, 3 = hard
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub difficulty: u8,
    /// 1 = high, 2 = medium, 3 = low
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub priority: u8,
    /// Estimated minutes (defaults to the configured estimate)
    #[arg(short, long)]
    pub estimate: Option<u32>,
    /// today, tomorrow, this week, or a date like 2024-06-01
    #[arg(long)]
    pub due: Option<String>,
    /// Micro-step (repeatable)
    #[arg(short, long = "step")]
    pub steps: Vec<String>,
}

/// Data directory, store and session for one command
pub struct Workspace {
    dir: PathBuf,
    store: FileStore,
    session: Session,
    now: NaiveDateTime,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let dir = ensure_tide_dir()?;
        let settings = load_settings(settings_file(&dir))?;
        let store = FileStore::open(store_file(&dir))?;
        let now = chrono::Local::now().naive_local();
        let session = Session::load(&store, settings, now.date());
        debug!(dir = %dir.display(), tasks = session.tasks().len(), "workspace opened");

        Ok(Self { dir, store, session, now })
    }

    fn emoji(&self) -> bool {
        self.session.settings().use_emoji
    }

    fn mood_line(&self, mood: Mood) -> String {
        if self.emoji() {
            mood.to_string()
        } else {
            mood.label().to_string()
        }
    }

    /// Default view: greeting, mood and today's focus
    pub fn dashboard(&self) -> Result<()> {
        match Session::user_name(&self.store) {
            Some(name) => println!("Hi {}!", name),
            None if !Session::onboarded(&self.store) => {
                println!("Welcome to tide. Run 'tide onboard' to set things up.");
            }
            None => {}
        }
        eprintln!("Using tide directory: {}", self.dir.display());

        match self.session.mood() {
            Some(mood) => {
                println!("Today: {}", self.mood_line(mood));
                println!("{}", mood.message());
            }
            None => println!("How are you feeling today? Run 'tide checkin <1-5>'."),
        }
        println!();
        self.focus()
    }

    pub fn check_in(&mut self, mood: u8, note: Option<&str>) -> Result<()> {
        let mood = Mood::new(mood)?;
        let today = self.now.date();
        self.session.check_in(&mut self.store, mood, today)?;

        println!("Checked in: {}", self.mood_line(mood));
        println!("{}", mood.focus_hint());
        if mood.asks_for_context() {
            match note {
                Some(note) if !note.trim().is_empty() => {
                    println!("Thanks for sharing. Go gently today.");
                    debug!(note, "check-in note");
                }
                _ => println!("Want to share what's going on? Add --note next time."),
            }
        }
        Ok(())
    }

    pub fn focus(&self) -> Result<()> {
        let mood = self.session.mood().unwrap_or_default();
        let focus = self.session.focus();
        self.print_section("Today's Focus", &focus);
        if focus.is_empty() && !self.session.tasks().is_empty() {
            println!("Nothing fits today's energy. Try 'tide list' for everything.");
        } else if self.session.checked_in() {
            println!("{}", mood.focus_hint());
        }
        Ok(())
    }

    pub fn today(&self) -> Result<()> {
        let buckets = self.session.buckets(self.now);
        self.print_section("Priority", &buckets.priority);
        self.print_section("Today", &buckets.today);
        self.print_section("Overdue", &buckets.overdue);
        println!("{} for today", buckets.today_count());
        Ok(())
    }

    pub fn upcoming(&self) -> Result<()> {
        let buckets = self.session.buckets(self.now);
        self.print_section("Tomorrow", &buckets.tomorrow);
        self.print_section("This Week", &buckets.this_week);
        self.print_section("Later", &buckets.later);
        println!("{} upcoming", buckets.upcoming_count());
        Ok(())
    }

    pub fn done(&self) -> Result<()> {
        let buckets = self.session.buckets(self.now);
        self.print_section("Completed Today", &buckets.today_completed);
        self.print_section("Completed Yesterday", &buckets.yesterday_completed);
        self.print_section("Completed Earlier", &buckets.other_completed);
        println!("{} completed", buckets.completed_count());
        Ok(())
    }

    pub fn list(&self, args: &ListArgs) -> Result<()> {
        let query = TaskQuery {
            search: args.search.clone(),
            status: args.status,
            category: args.category.clone(),
            date: args.date,
            sort: args.sort,
        };
        let tasks = self.session.query(&query, self.now);
        self.print_section(&format!("All Tasks (by {})", args.sort), &tasks);
        if query.is_filtered() {
            println!("{} of {} tasks match", tasks.len(), self.session.tasks().len());
        }
        Ok(())
    }

    pub fn add(&mut self, args: AddArgs) -> Result<()> {
        let mut draft = TaskDraft::new(args.title);
        draft.description = args.description;
        draft.category = args.category;
        draft.difficulty = Difficulty::try_from(args.difficulty)?;
        draft.priority = Priority::try_from(args.priority)?;
        draft.estimated_time = args
            .estimate
            .unwrap_or(self.session.settings().default_estimate_minutes);
        draft.due_date = args.due;
        draft.micro_tasks = args.steps;

        let line = {
            let task = self.session.add_task(draft)?;
            format!("Added {} {}", short_id(&task.id), task.title)
        };
        self.session.save(&mut self.store)?;
        println!("{}", line);
        Ok(())
    }

    pub fn complete(&mut self, id: &str) -> Result<()> {
        let completion = self.session.complete_task(id)?;
        self.session.save(&mut self.store)?;

        let badge = completion.task.difficulty.celebration_badge();
        if self.emoji() {
            println!("🎉 {} ({})", completion.task.title, badge);
        } else {
            println!("Done: {} ({})", completion.task.title, badge);
        }
        println!("{}", celebration_message(completion.percent));
        if completion.all_done {
            println!("Everything is done. Time for 'tide reflect'.");
        }
        Ok(())
    }

    pub fn timer(&mut self, id: &str, elapsed: u32, steps: &[usize], finish: bool) -> Result<()> {
        let task = self.session.find(id)?.clone();
        if task.completed {
            bail!("{} is already completed", task.title);
        }

        let mood = self.session.mood().unwrap_or_default();
        let mut timer = FocusTimer::new(task);
        timer.toggle();
        timer.tick(chrono::Duration::minutes(i64::from(elapsed)));
        for step in steps {
            let toggled = step.checked_sub(1).is_some_and(|i| timer.toggle_step(i));
            if !toggled {
                bail!("{} has no micro-step {}", timer.task.title, step);
            }
        }

        println!(
            "{}  [{}]  {} left ({:.0}% elapsed)",
            timer.task.title,
            timer.task.difficulty.label_for_mood(mood),
            timer.clock(),
            timer.percent_elapsed()
        );
        for (step, done) in timer.task.micro_tasks.iter().zip(&timer.steps_done) {
            println!("  [{}] {}", if *done { "x" } else { " " }, step);
        }
        if !timer.steps_done.is_empty() {
            println!(
                "  {}/{} steps ({:.0}%)",
                timer.steps_completed(),
                timer.steps_done.len(),
                timer.step_percent()
            );
        }

        if timer.is_finished() {
            println!("Time's up!");
        }
        if finish {
            let id = timer.task.id.clone();
            self.session.update_task(timer.finish())?;
            self.session.save(&mut self.store)?;
            println!("Marked {} as done.", short_id(&id));
        }
        Ok(())
    }

    pub fn stats(&self) -> Result<()> {
        let stats = self.session.stats(self.now);
        let percent = tasktide::organizer::completion_percentage(stats.completed, stats.total);
        println!("Total:          {}", stats.total);
        println!("Completed:      {} ({}%)", stats.completed, percent);
        println!("Incomplete:     {}", stats.incomplete);
        println!("High priority:  {}", stats.high_priority);
        println!("Due today:      {}", stats.today);
        println!("Overdue:        {}", stats.overdue);
        Ok(())
    }

    pub fn reflect<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<()> {
        run_reflection(&self.session, input, out).map(|_| ())
    }

    pub fn onboard<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        if Session::onboarded(&self.store) {
            writeln!(out, "You're already set up. Edit {} to start over.", self.store.path().display())?;
            return Ok(());
        }

        let estimate = self.session.settings().default_estimate_minutes;
        let default_category = self.session.settings().default_category.clone();
        let Some(profile) = run_onboarding(estimate, &default_category, input, out)? else {
            return Ok(());
        };

        self.session.apply_onboarding(&mut self.store, &profile)?;
        self.session.check_in(&mut self.store, profile.mood, self.now.date())?;
        writeln!(out, "Welcome aboard, {}! Run 'tide' to see today's focus.", profile.user_name)?;
        Ok(())
    }

    fn print_section(&self, title: &str, tasks: &[Task]) {
        println!("{} ({})", title, tasks.len());
        let mood = self.session.mood().unwrap_or_default();
        for task in tasks {
            println!("  {}", self.task_line(task, mood));
        }
    }

    fn task_line(&self, task: &Task, mood: Mood) -> String {
        let check = if task.completed { "x" } else { " " };
        let difficulty = if self.emoji() {
            format!("{} {}", task.difficulty.symbol(), task.difficulty.label_for_mood(mood))
        } else {
            task.difficulty.label_for_mood(mood).to_string()
        };
        let mut line = format!(
            "[{}] {}  {}  ({}, {}, {}m",
            check,
            short_id(&task.id),
            task.title,
            task.category,
            difficulty,
            task.estimated_time
        );
        if let Some(due) = &task.due_date {
            line.push_str(&format!(", due {}", due));
        }
        if is_overdue(task, self.now) {
            line.push_str(", overdue");
        }
        line.push(')');
        line
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Read one trimmed line; `None` at end of input
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<Option<String>> {
    write!(out, "{} ", question)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line).context("Failed to read input")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_mood<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<Option<Mood>> {
    loop {
        let Some(answer) = prompt(input, out, question)? else {
            return Ok(None);
        };
        match answer.parse::<u8>().ok().and_then(|v| Mood::new(v).ok()) {
            Some(mood) => return Ok(Some(mood)),
            None => writeln!(out, "Please enter a number from 1 to 5.")?,
        }
    }
}

fn is_no(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "n" | "no")
}

/// Walk the evening reflection on a line-based terminal.
///
/// Returns `None` if input ends before the reflection completes.
fn run_reflection<R: BufRead, W: Write>(
    session: &Session,
    input: &mut R,
    out: &mut W,
) -> Result<Option<tasktide::flow::Reflection>> {
    let mut wizard = ReflectionWizard::new(session.tasks(), session.mood())?;

    loop {
        let step = wizard.current_step();
        writeln!(out, "\n== {} ({}%) ==", step.title(), wizard.progress_percent())?;

        let event = match step {
            ReflectionStep::Summary => {
                let summary = wizard.summary().clone();
                writeln!(out, "You completed {} of {} tasks ({}%).", summary.completed, summary.total, summary.percent)?;
                for title in &summary.completed_titles {
                    writeln!(out, "  - {}", title)?;
                }
                writeln!(out, "{}", summary.encouragement())?;

                let Some(mood) = prompt_mood(input, out, "How are you feeling this evening? (1-5)")? else {
                    return Ok(None);
                };
                wizard.set_evening_mood(mood)?;
                if let Some(change) = wizard.mood_change() {
                    writeln!(out, "{}", change)?;
                }
                wizard.advance()?
            }
            ReflectionStep::Questions => {
                let Some(answer) = prompt(input, out, "What went well today? (leave blank to skip the questions)")? else {
                    return Ok(None);
                };
                if answer.is_empty() {
                    wizard.skip_questions()?
                } else {
                    wizard.set_reflection(&answer)?;
                    let Some(gratitude) = prompt(input, out, "What are you grateful for?")? else {
                        return Ok(None);
                    };
                    wizard.set_gratitude(&gratitude)?;
                    wizard.advance()?
                }
            }
            ReflectionStep::Tomorrow => {
                let Some(priority) = prompt(input, out, "What's your main priority for tomorrow?")? else {
                    return Ok(None);
                };
                wizard.set_tomorrow_priority(&priority)?;
                wizard.advance()?
            }
            ReflectionStep::Goodnight => {
                writeln!(out, "Rest well. Tomorrow is a fresh start.")?;
                wizard.advance()?
            }
        };

        match event {
            ReflectionEvent::Step(_) => {}
            ReflectionEvent::Done(reflection) => return Ok(Some(reflection)),
            ReflectionEvent::Exit => return Ok(None),
        }
    }
}

/// Walk onboarding on a line-based terminal.
///
/// Returns `None` if input ends before onboarding completes.
fn run_onboarding<R: BufRead, W: Write>(
    estimate_minutes: u32,
    default_category: &str,
    input: &mut R,
    out: &mut W,
) -> Result<Option<tasktide::flow::OnboardingProfile>> {
    let mut wizard = OnboardingWizard::new(estimate_minutes)?;

    loop {
        let step = wizard.current_step();
        writeln!(out, "\n[{}%] {}", wizard.progress_percent(), step.prompt())?;

        let event = match step {
            OnboardingStep::Welcome => {
                let Some(name) = prompt(input, out, "Name:")? else {
                    return Ok(None);
                };
                wizard.set_user_name(&name)?;
                match wizard.advance() {
                    Ok(event) => event,
                    Err(_) => {
                        writeln!(out, "Please tell us your name.")?;
                        continue;
                    }
                }
            }
            OnboardingStep::EmotionalProfile => {
                for (i, (_, label)) in OVERWHELM_OPTIONS.iter().enumerate() {
                    writeln!(out, "  {}. {}", i + 1, label)?;
                }
                let Some(answer) = prompt(input, out, "Pick any (e.g. 1,3) or leave blank:")? else {
                    return Ok(None);
                };
                for choice in answer.split(',').filter_map(|c| c.trim().parse::<usize>().ok()) {
                    if let Some((key, _)) = choice.checked_sub(1).and_then(|i| OVERWHELM_OPTIONS.get(i)) {
                        wizard.toggle_overwhelm(key)?;
                    }
                }
                wizard.advance()?
            }
            OnboardingStep::CommunicationPreferences => {
                for (i, (_, label)) in COMMUNICATION_OPTIONS.iter().enumerate() {
                    writeln!(out, "  {}. {}", i + 1, label)?;
                }
                let Some(answer) = prompt(input, out, "Choose one:")? else {
                    return Ok(None);
                };
                let chosen = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|c| c.checked_sub(1))
                    .and_then(|i| COMMUNICATION_OPTIONS.get(i));
                let Some((key, _)) = chosen else {
                    writeln!(out, "Please pick 1 to {}.", COMMUNICATION_OPTIONS.len())?;
                    continue;
                };
                let number = if *key == "whatsapp" {
                    prompt(input, out, "WhatsApp number:")?
                } else {
                    None
                };
                wizard.set_communication(key, number.as_deref())?;
                wizard.advance()?
            }
            OnboardingStep::FirstMoodCheck => {
                let Some(mood) = prompt_mood(input, out, "1 (overwhelmed) to 5 (great):")? else {
                    return Ok(None);
                };
                wizard.set_mood(mood)?;
                writeln!(out, "{}", mood.message())?;
                wizard.advance()?
            }
            OnboardingStep::TaskWalkthrough => wizard.advance()?,
            OnboardingStep::AddFirstTask | OnboardingStep::AddSecondTask | OnboardingStep::AddThirdTask => {
                let Some(title) = prompt(input, out, "Task:")? else {
                    return Ok(None);
                };
                writeln!(out, "  Categories: {}", TASK_CATEGORIES.join(", "))?;
                let Some(category) = prompt(input, out, &format!("Category [{}]:", default_category))? else {
                    return Ok(None);
                };
                let category = if category.is_empty() { default_category } else { category.as_str() };
                match wizard.add_task(&title, category) {
                    Ok(event) => event,
                    Err(e) => {
                        writeln!(out, "{}", e)?;
                        continue;
                    }
                }
            }
            OnboardingStep::AiProcessing => {
                wizard.begin_processing(Instant::now())?;
                loop {
                    std::thread::sleep(tick_duration());
                    if let Some(event) = wizard.poll_processing(Instant::now())? {
                        break event;
                    }
                }
            }
            OnboardingStep::TaskPrioritization => {
                for (i, task) in wizard.prioritized().iter().enumerate() {
                    writeln!(
                        out,
                        "  {}. {} ({}, {}, {}m)",
                        i + 1,
                        task.title,
                        task.priority.label(),
                        task.difficulty.label(),
                        task.estimated_time
                    )?;
                }
                if let Some(first) = wizard.prioritized().first() {
                    writeln!(out, "{}", first.reason)?;
                }
                wizard.advance()?
            }
            OnboardingStep::TutorialOverlays => {
                let Some(answer) = prompt(input, out, "Show a few tips? [Y/n]")? else {
                    return Ok(None);
                };
                if is_no(&answer) {
                    wizard.skip_tutorial()?
                } else {
                    writeln!(out, "  'tide checkin' each morning shapes your focus list.")?;
                    writeln!(out, "  'tide timer <id>' tracks a task and its micro-steps.")?;
                    writeln!(out, "  'tide reflect' closes the day.")?;
                    wizard.advance()?
                }
            }
            OnboardingStep::Complete => wizard.advance()?,
        };

        match event {
            OnboardingEvent::Step(_) => {}
            OnboardingEvent::Done(profile) => return Ok(Some(profile)),
            OnboardingEvent::Exit => return Ok(None),
        }
    }
}
